//! Target parsing and resolution.
//!
//! A target is either an IP address literal or a hostname. Hostnames are
//! resolved once, up front, to a single address.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("unable to resolve {0}: {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// An unresolved target specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A literal IP address.
    Single(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this specification to a single scan target.
    ///
    /// When a hostname has several addresses, IPv4 is preferred.
    pub async fn resolve(&self) -> Result<ScanTarget, TargetError> {
        match self {
            Self::Single(ip) => Ok(ScanTarget::new(ip.to_string(), *ip)),

            Self::Hostname(hostname) => {
                let (config, opts) = resolver_config();
                let resolver = TokioAsyncResolver::tokio(config, opts);

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ips: Vec<IpAddr> = response.iter().collect();
                debug!(hostname = %hostname, addresses = ?ips, "resolved target");

                ips.iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| ips.first())
                    .map(|ip| ScanTarget::new(hostname.clone(), *ip))
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// The host's resolver configuration (`/etc/resolv.conf` on Unix), so local
/// search domains and name servers apply. Falls back to the built-in public
/// resolvers when it cannot be read.
fn resolver_config() -> (ResolverConfig, ResolverOpts) {
    read_system_conf().unwrap_or_else(|e| {
        debug!(error = %e, "system resolver configuration unavailable, using defaults");
        (ResolverConfig::default(), ResolverOpts::default())
    })
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // A single trailing dot marks a fully qualified name
    let s = s.strip_suffix('.').unwrap_or(s);

    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}
