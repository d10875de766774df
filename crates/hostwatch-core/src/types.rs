//! Hosts, check kinds, and schedule specifications

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// A probed host: a hostname or address, compared by exact value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Host(Arc<str>);

impl Host {
    /// Create a host, rejecting empty or whitespace-only names
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(Error::validation("host must not be empty"));
        }
        Ok(Self(Arc::from(name)))
    }

    /// Host name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Host {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Host::new(s)
    }
}

impl TryFrom<String> for Host {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Host::new(value)
    }
}

impl From<Host> for String {
    fn from(host: Host) -> Self {
        host.0.to_string()
    }
}

/// Reachability check mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// ICMP echo via the system `ping` command
    Icmp,
    /// HTTP HEAD over TCP
    Tcp,
    /// Route tracing via the system `traceroute` command
    Traceroute,
}

impl CheckKind {
    /// All check kinds, in report order
    pub const ALL: [CheckKind; 3] = [CheckKind::Icmp, CheckKind::Tcp, CheckKind::Traceroute];
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Icmp => write!(f, "icmp"),
            CheckKind::Tcp => write!(f, "tcp"),
            CheckKind::Traceroute => write!(f, "traceroute"),
        }
    }
}

/// Hosts, cadence, and per-attempt timeout for one probe type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSpec {
    hosts: Vec<Host>,
    interval: Duration,
    timeout: Duration,
}

impl ScheduleSpec {
    /// Create a schedule spec. Duplicate hosts are kept and scheduled twice.
    pub fn new(hosts: Vec<Host>, interval: Duration, timeout: Duration) -> Result<Self> {
        if hosts.is_empty() {
            return Err(Error::validation("schedule requires at least one host"));
        }
        Ok(Self {
            hosts,
            interval,
            timeout,
        })
    }

    /// Create a schedule spec from signed millisecond values
    pub fn from_millis(hosts: Vec<Host>, interval_ms: i64, timeout_ms: i64) -> Result<Self> {
        let interval = u64::try_from(interval_ms).map_err(|_| {
            Error::validation(format!("interval must be non-negative, got {interval_ms}ms"))
        })?;
        let timeout = u64::try_from(timeout_ms).map_err(|_| {
            Error::validation(format!("timeout must be non-negative, got {timeout_ms}ms"))
        })?;
        Self::new(
            hosts,
            Duration::from_millis(interval),
            Duration::from_millis(timeout),
        )
    }

    /// Hosts to probe, in configuration order
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Delay between the end of one execution and the start of the next
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Per-attempt timeout handed to the probe
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
