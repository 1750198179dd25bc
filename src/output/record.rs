//! The per-port result record and its fixed field layout
//!
//! Every output format walks [`FIELDS`] in order. JSON serialization, the CSV
//! header and CSV rows all match exhaustively on [`Field`], so adding a field
//! without teaching every format about it does not compile.

use crate::network::Port;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of columns in every emitted record
pub const FIELD_COUNT: usize = 6;

/// Record fields in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    Ip,
    Port,
    Cdn,
    CdnName,
    Timestamp,
}

/// Output order shared by the JSON and CSV encoders
pub const FIELDS: [Field; FIELD_COUNT] = [
    Field::Host,
    Field::Ip,
    Field::Port,
    Field::Cdn,
    Field::CdnName,
    Field::Timestamp,
];

// FIELDS must list every variant exactly once, in declaration order.
const _: () = {
    assert!(Field::Timestamp as usize + 1 == FIELD_COUNT);
    let mut i = 0;
    while i < FIELD_COUNT {
        assert!(FIELDS[i] as usize == i);
        i += 1;
    }
};

impl Field {
    /// Key used for both the JSON object and the CSV header
    pub const fn name(self) -> &'static str {
        match self {
            Field::Host => "host",
            Field::Ip => "ip",
            Field::Port => "port",
            Field::Cdn => "cdn",
            Field::CdnName => "cdn-name",
            Field::Timestamp => "timestamp",
        }
    }
}

/// CSV header row, one token per field
pub fn csv_headers() -> [&'static str; FIELD_COUNT] {
    FIELDS.map(Field::name)
}

/// One reported port for one host.
///
/// Built transiently inside an emission call and dropped once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord<'a> {
    pub host: &'a str,
    pub ip: &'a str,
    pub port: Port,
    pub cdn: bool,
    pub cdn_name: &'a str,
    pub timestamp: DateTime<Utc>,
}

impl<'a> ResultRecord<'a> {
    pub fn new(host: &'a str, ip: &'a str, port: Port, timestamp: DateTime<Utc>) -> Self {
        Self {
            host,
            ip,
            port,
            cdn: false,
            cdn_name: "",
            timestamp,
        }
    }

    pub fn with_cdn(mut self, cdn: bool, cdn_name: &'a str) -> Self {
        self.cdn = cdn;
        self.cdn_name = cdn_name;
        self
    }

    /// Host as presented in output: empty when the target was the IP itself
    pub fn display_host(&self) -> &'a str {
        if self.host == self.ip {
            ""
        } else {
            self.host
        }
    }

    /// RFC3339 UTC timestamp, shared by the JSON and CSV encodings
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Stringified value of a single field as written to CSV
    pub fn csv_value(&self, field: Field) -> String {
        match field {
            Field::Host => self.display_host().to_string(),
            Field::Ip => self.ip.to_string(),
            Field::Port => self.port.to_string(),
            Field::Cdn => self.cdn.to_string(),
            Field::CdnName => self.cdn_name.to_string(),
            Field::Timestamp => self.timestamp_rfc3339(),
        }
    }

    /// CSV row in [`FIELDS`] order
    pub fn csv_row(&self) -> [String; FIELD_COUNT] {
        FIELDS.map(|field| self.csv_value(field))
    }
}

impl Serialize for ResultRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in FIELDS {
            let key = field.name();
            match field {
                Field::Host => {
                    let host = self.display_host();
                    if !host.is_empty() {
                        map.serialize_entry(key, host)?;
                    }
                }
                Field::Ip => map.serialize_entry(key, self.ip)?,
                Field::Port => map.serialize_entry(key, &self.port)?,
                Field::Cdn => {
                    if self.cdn {
                        map.serialize_entry(key, &true)?;
                    }
                }
                Field::CdnName => {
                    if !self.cdn_name.is_empty() {
                        map.serialize_entry(key, self.cdn_name)?;
                    }
                }
                Field::Timestamp => map.serialize_entry(key, &self.timestamp_rfc3339())?,
            }
        }
        map.end()
    }
}
