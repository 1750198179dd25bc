//! Error handling for result emission and target resolution
//!
//! Resolution failures come in two distinct kinds so callers can tell a
//! broken lookup apart from a name that simply has no addresses.

use thiserror::Error;

/// Boxed error produced by a [`crate::resolver::DnsClient`] implementation
pub type DnsError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for emission and resolution operations
#[derive(Debug, Error)]
pub enum ScanError {
    /// The DNS query failed or returned no data at all
    #[error("Could not get IP for host: {host}")]
    ResolutionFailed {
        host: String,
        #[source]
        source: Option<DnsError>,
    },

    /// The DNS query succeeded but yielded neither A nor AAAA records
    #[error("no IP addresses found for host: {0}")]
    NoAddresses(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for emission and resolution operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// True for both resolution kinds
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            ScanError::ResolutionFailed { .. } | ScanError::NoAddresses(_)
        )
    }

    /// True when the failure happened while writing to the output sink
    pub fn is_sink(&self) -> bool {
        matches!(self, ScanError::Io(_) | ScanError::Json(_) | ScanError::Csv(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_resolution_kinds_are_distinct() {
        let failed = ScanError::ResolutionFailed {
            host: "example.com".to_string(),
            source: Some(Box::new(io::Error::new(io::ErrorKind::Other, "servfail"))),
        };
        let empty = ScanError::NoAddresses("example.com".to_string());

        assert!(failed.is_resolution());
        assert!(empty.is_resolution());
        assert!(failed.source().is_some());
        assert!(empty.source().is_none());
        assert_eq!(empty.to_string(), "no IP addresses found for host: example.com");
    }

    #[test]
    fn test_sink_errors() {
        let err: ScanError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(err.is_sink());
        assert!(!err.is_resolution());
    }
}
