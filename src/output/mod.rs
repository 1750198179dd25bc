//! Output formatting and management
//!
//! Each completed host is streamed to the sink as soon as it is done, one
//! line or row per discovered port. The emitters never buffer more than one
//! host's ports.

pub mod record;

pub use record::{csv_headers, Field, ResultRecord, FIELDS, FIELD_COUNT};

use crate::error::ScanResult;
use crate::network::Port;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Ports found on one resolved address of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    /// Target as given by the user, hostname or IP literal
    pub host: String,
    pub ip: String,
    pub ports: Vec<Port>,
    pub cdn: bool,
    pub cdn_name: Option<String>,
}

impl HostResult {
    pub fn new(host: impl Into<String>, ip: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            host: host.into(),
            ip: ip.into(),
            ports,
            cdn: false,
            cdn_name: None,
        }
    }

    /// Attach the CDN annotation produced by the range lookup
    pub fn with_cdn(mut self, cdn: bool, cdn_name: Option<String>) -> Self {
        self.cdn = cdn;
        self.cdn_name = cdn_name.filter(|name| !name.is_empty());
        self
    }

    fn cdn_name(&self) -> &str {
        self.cdn_name.as_deref().unwrap_or("")
    }
}

/// Write `host:port` lines, with a ` [cdn]` suffix when a CDN name is known.
///
/// A failed line stops the host; bytes already accepted are flushed before
/// the error is returned.
pub fn write_host_output<W: Write>(result: &HostResult, writer: W) -> ScanResult<()> {
    let mut bufwriter = BufWriter::new(writer);
    let cdn_name = result.cdn_name();
    let mut line = String::new();

    for port in &result.ports {
        line.clear();
        line.push_str(&result.host);
        line.push(':');
        line.push_str(&port.port.to_string());
        if !cdn_name.is_empty() {
            line.push_str(" [");
            line.push_str(cdn_name);
            line.push(']');
        }
        line.push('\n');

        if let Err(err) = bufwriter.write_all(line.as_bytes()) {
            let _ = bufwriter.flush();
            return Err(err.into());
        }
    }

    bufwriter.flush()?;
    Ok(())
}

/// Write one JSON object per port, newline terminated (JSON Lines).
pub fn write_json_output<W: Write>(result: &HostResult, mut writer: W) -> ScanResult<()> {
    let timestamp = Utc::now();
    let cdn_name = result.cdn_name();

    for port in &result.ports {
        let record = ResultRecord::new(&result.host, &result.ip, *port, timestamp)
            .with_cdn(result.cdn, cdn_name);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        writer.write_all(&line)?;
    }

    Ok(())
}

/// Write one CSV row per port, preceded by the header row when `header` is set.
///
/// The first row the sink rejects is reported; rows before it are flushed.
pub fn write_csv_output<W: Write>(result: &HostResult, header: bool, writer: W) -> ScanResult<()> {
    let timestamp = Utc::now();
    let cdn_name = result.cdn_name();
    let mut encoder = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if header {
        encoder.write_record(csv_headers())?;
    }

    for port in &result.ports {
        let record = ResultRecord::new(&result.host, &result.ip, *port, timestamp)
            .with_cdn(result.cdn, cdn_name);
        if let Err(err) = encoder.write_record(record.csv_row()) {
            let _ = encoder.flush();
            return Err(err.into());
        }
    }

    encoder.flush()?;
    Ok(())
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub csv_header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            csv_header: true,
        }
    }
}

/// Main output manager
///
/// Dispatches completed hosts to the configured emitter. Owns the
/// "header already written" state for CSV so the header appears once per sink.
#[derive(Debug)]
pub struct OutputManager {
    config: OutputConfig,
    header_written: bool,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            header_written: false,
        }
    }

    /// Write one completed host
    pub fn write_host<W: Write>(&mut self, result: &HostResult, writer: W) -> ScanResult<()> {
        log::debug!(
            "Writing {} ports for {} ({}) as {}",
            result.ports.len(),
            result.host,
            result.ip,
            self.config.format
        );

        match self.config.format {
            OutputFormat::Text => write_host_output(result, writer),
            OutputFormat::Json => write_json_output(result, writer),
            OutputFormat::Csv => {
                let header = self.config.csv_header && !self.header_written;
                write_csv_output(result, header, writer)?;
                self.header_written = true;
                Ok(())
            }
        }
    }
}
