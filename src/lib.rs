//! portscribe - result emission and target resolution for port scanners
//!
//! Writes discovered ports as text, JSON Lines or CSV with one stable field
//! order, and turns scan targets into the IP addresses to scan.

pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod platform;
pub mod resolver;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use config::ReportConfig;
pub use error::{ScanError, ScanResult};
pub use network::{Port, Protocol};
pub use output::{
    write_csv_output, write_host_output, write_json_output, HostResult, OutputFormat,
    OutputManager, ResultRecord,
};
pub use resolver::{DnsClient, DnsData, HickoryDnsClient, HostResolver};

pub type Result<T> = std::result::Result<T, ScanError>;
