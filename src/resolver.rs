//! Target to IP address resolution
//!
//! IP literals pass straight through. Hostnames are resolved once through a
//! [`DnsClient`] for A and AAAA records; retry policy belongs to the caller.

use crate::error::{DnsError, ScanError, ScanResult};
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::Resolver;
use std::net::IpAddr;

/// A and AAAA answers for one name, in the order the server returned them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsData {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
}

/// Blocking DNS query capability.
///
/// `Ok(None)` means the query completed but produced no data for the name.
pub trait DnsClient {
    fn query_multiple(&self, host: &str) -> Result<Option<DnsData>, DnsError>;
}

impl<C: DnsClient + ?Sized> DnsClient for &C {
    fn query_multiple(&self, host: &str) -> Result<Option<DnsData>, DnsError> {
        (**self).query_multiple(host)
    }
}

/// Resolves scan targets into the addresses that will be scanned
#[derive(Debug, Clone)]
pub struct HostResolver<C> {
    client: C,
}

impl<C: DnsClient> HostResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Resolve `target` into IP strings, A records first then AAAA.
    pub fn resolve(&self, target: &str) -> ScanResult<Vec<String>> {
        if target.parse::<IpAddr>().is_ok() {
            log::debug!("Found 1 addresses for {}", target);
            return Ok(vec![target.to_string()]);
        }

        let data = match self.client.query_multiple(target) {
            Ok(Some(data)) => data,
            Ok(None) => {
                log::warn!("Could not get IP for host: {}", target);
                return Err(ScanError::ResolutionFailed {
                    host: target.to_string(),
                    source: None,
                });
            }
            Err(err) => {
                log::warn!("Could not get IP for host: {} ({})", target, err);
                return Err(ScanError::ResolutionFailed {
                    host: target.to_string(),
                    source: Some(err),
                });
            }
        };

        let mut ips = data.a;
        ips.extend(data.aaaa);
        if ips.is_empty() {
            return Err(ScanError::NoAddresses(target.to_string()));
        }

        log::debug!("Found {} addresses for {}", ips.len(), target);
        Ok(ips)
    }
}

/// [`DnsClient`] backed by the hickory stub resolver
pub struct HickoryDnsClient {
    resolver: Resolver,
}

impl HickoryDnsClient {
    /// Use the nameservers from the system configuration
    pub fn from_system_conf() -> ScanResult<Self> {
        let resolver = Resolver::from_system_conf()?;
        Ok(Self { resolver })
    }

    /// Query the given nameservers over UDP/TCP port 53
    pub fn with_nameservers(nameservers: &[IpAddr]) -> ScanResult<Self> {
        if nameservers.is_empty() {
            return Err(ScanError::ConfigError(
                "at least one resolver address is required".to_string(),
            ));
        }
        let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        let resolver = Resolver::new(config, ResolverOpts::default())?;
        Ok(Self { resolver })
    }
}

impl std::fmt::Debug for HickoryDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryDnsClient").finish_non_exhaustive()
    }
}

/// Empty answer for the record type, carrying the response code
fn no_records(err: &ResolveError) -> Option<ResponseCode> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => Some(*response_code),
        _ => None,
    }
}

/// Fold the A and AAAA lookup outcomes into one answer.
///
/// NXDOMAIN on both means the name does not exist (`Ok(None)`). Any other
/// empty answer counts as no records of that type. Other errors are returned,
/// the A error first.
fn classify_lookups(
    a: Result<Vec<String>, ResolveError>,
    aaaa: Result<Vec<String>, ResolveError>,
) -> Result<Option<DnsData>, DnsError> {
    let mut nxdomain = 0;
    let mut records = [Vec::new(), Vec::new()];

    for (slot, lookup) in records.iter_mut().zip([a, aaaa]) {
        match lookup {
            Ok(ips) => *slot = ips,
            Err(err) => match no_records(&err) {
                Some(ResponseCode::NXDomain) => nxdomain += 1,
                Some(_) => {}
                None => return Err(Box::new(err)),
            },
        }
    }

    if nxdomain == 2 {
        return Ok(None);
    }
    let [a, aaaa] = records;
    Ok(Some(DnsData { a, aaaa }))
}

impl DnsClient for HickoryDnsClient {
    fn query_multiple(&self, host: &str) -> Result<Option<DnsData>, DnsError> {
        let a = self
            .resolver
            .ipv4_lookup(host)
            .map(|lookup| lookup.iter().map(|a| a.to_string()).collect());
        let aaaa = self
            .resolver
            .ipv6_lookup(host)
            .map(|lookup| lookup.iter().map(|aaaa| aaaa.to_string()).collect());
        classify_lookups(a, aaaa)
    }
}
