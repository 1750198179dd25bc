//! Port and transport protocol types shared by the emitters

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Protocol enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered port together with its transport tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub port: u16,
    pub protocol: Protocol,
    pub tls: bool,
}

impl Port {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self {
            port,
            protocol,
            tls: false,
        }
    }

    pub fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    pub fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// Renders the bare port number, as used by the text and CSV outputs
impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.port)
    }
}

/// Collect a deduplicated port set into a vector ordered by number, then protocol
pub fn ports_from_set(set: &HashSet<Port>) -> Vec<Port> {
    let mut ports: Vec<Port> = set.iter().copied().collect();
    ports.sort_by_key(|p| (p.port, p.protocol));
    ports
}

/// Parse a port list such as `22,80,8000-8010,U:53`.
///
/// `T:` and `U:` prefixes pick the protocol for one entry, anything else uses
/// `default_protocol`. Duplicates are removed.
pub fn parse_ports(port_spec: &str, default_protocol: Protocol) -> ScanResult<Vec<Port>> {
    let mut ports = HashSet::new();

    for part in port_spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (protocol, port_part) = match part.split_once(':') {
            Some(("T" | "t", rest)) => (Protocol::Tcp, rest),
            Some(("U" | "u", rest)) => (Protocol::Udp, rest),
            Some(_) => return Err(ScanError::InvalidTarget(format!("Invalid port: {}", part))),
            None => (default_protocol, part),
        };

        let (start, end) = match port_part.split_once('-') {
            Some((start, end)) => (parse_port_number(start)?, parse_port_number(end)?),
            None => {
                let port = parse_port_number(port_part)?;
                (port, port)
            }
        };
        if start > end {
            return Err(ScanError::InvalidTarget(format!(
                "Start port {} cannot be greater than end port {}",
                start, end
            )));
        }
        ports.extend((start..=end).map(|port| Port::new(port, protocol)));
    }

    if ports.is_empty() {
        return Err(ScanError::InvalidTarget("No ports given".to_string()));
    }
    Ok(ports_from_set(&ports))
}

fn parse_port_number(s: &str) -> ScanResult<u16> {
    match s.trim().parse::<u16>() {
        Ok(0) => Err(ScanError::InvalidTarget("Port 0 is not valid".to_string())),
        Ok(port) => Ok(port),
        Err(e) => Err(ScanError::InvalidTarget(format!("Invalid port '{}': {}", s, e))),
    }
}
