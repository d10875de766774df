//! Configuration types

use hostwatch_core::{CheckKind, Host, Result, ScheduleSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default `max_threads` when unset or unusable
pub const DEFAULT_MAX_THREADS: usize = 16;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Hosts probed by every check that does not list its own
    #[serde(default)]
    pub hosts: HostList,

    /// Per-attempt probe timeout shared by all checks (0 = no limit)
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub response_timeout: Duration,

    /// Upper bound on concurrent probe executions
    #[serde(default)]
    pub max_threads: MaxThreads,

    /// Time allowed for in-flight probes to finish on shutdown
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Failure report delivery
    #[serde(default)]
    pub report: ReportConfig,

    /// Per-check settings
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Observability
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: HostList::default(),
            response_timeout: default_timeout(),
            max_threads: MaxThreads::default(),
            shutdown_timeout: default_shutdown_timeout(),
            report: ReportConfig::default(),
            checks: ChecksConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Settings for one check kind
    pub fn check(&self, kind: CheckKind) -> &CheckConfig {
        match kind {
            CheckKind::Icmp => &self.checks.icmp,
            CheckKind::Tcp => &self.checks.tcp,
            CheckKind::Traceroute => &self.checks.trace,
        }
    }

    /// Check kinds that are switched on
    pub fn enabled_checks(&self) -> Vec<CheckKind> {
        CheckKind::ALL
            .into_iter()
            .filter(|kind| self.check(*kind).enabled)
            .collect()
    }

    /// Hosts probed by `kind`: its own list when present, the shared list otherwise
    pub fn host_names(&self, kind: CheckKind) -> &[String] {
        match &self.check(kind).hosts {
            Some(hosts) => hosts.as_slice(),
            None => self.hosts.as_slice(),
        }
    }

    /// Schedule for `kind`
    pub fn schedule_spec(&self, kind: CheckKind) -> Result<ScheduleSpec> {
        let hosts = self
            .host_names(kind)
            .iter()
            .map(Host::new)
            .collect::<Result<Vec<_>>>()?;

        ScheduleSpec::new(hosts, self.check(kind).interval, self.response_timeout)
    }
}

/// Ordered host names, written either as a list or as one `;`-separated string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HostListRepr", into = "Vec<String>")]
pub struct HostList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum HostListRepr {
    List(Vec<String>),
    Joined(String),
}

impl From<HostListRepr> for HostList {
    fn from(repr: HostListRepr) -> Self {
        match repr {
            HostListRepr::List(hosts) => HostList(hosts),
            HostListRepr::Joined(joined) => HostList(
                joined
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

impl From<HostList> for Vec<String> {
    fn from(list: HostList) -> Self {
        list.0
    }
}

impl From<Vec<String>> for HostList {
    fn from(hosts: Vec<String>) -> Self {
        HostList(hosts)
    }
}

impl HostList {
    /// Host names in configured order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Concurrency bound that tolerates unusable values.
///
/// Zero, negative, and non-numeric values fall back to
/// [`DEFAULT_MAX_THREADS`] with a warning instead of failing the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MaxThreadsRepr", into = "usize")]
pub struct MaxThreads(usize);

#[derive(Deserialize)]
#[serde(untagged)]
enum MaxThreadsRepr {
    Num(i64),
    Text(String),
}

impl From<MaxThreadsRepr> for MaxThreads {
    fn from(repr: MaxThreadsRepr) -> Self {
        let parsed = match &repr {
            MaxThreadsRepr::Num(n) => usize::try_from(*n).ok(),
            MaxThreadsRepr::Text(s) => s.trim().parse::<usize>().ok(),
        };

        match parsed {
            Some(n) if n > 0 => MaxThreads(n),
            _ => {
                let raw = match repr {
                    MaxThreadsRepr::Num(n) => n.to_string(),
                    MaxThreadsRepr::Text(s) => s,
                };
                tracing::warn!(
                    value = %raw,
                    default = DEFAULT_MAX_THREADS,
                    "Invalid max_threads, using default"
                );
                MaxThreads::default()
            }
        }
    }
}

impl From<MaxThreads> for usize {
    fn from(max: MaxThreads) -> Self {
        max.0
    }
}

impl Default for MaxThreads {
    fn default() -> Self {
        MaxThreads(DEFAULT_MAX_THREADS)
    }
}

impl MaxThreads {
    /// Create a bound; zero yields the default
    pub fn new(n: usize) -> Self {
        if n == 0 {
            Self::default()
        } else {
            MaxThreads(n)
        }
    }

    /// Configured bound
    pub fn get(self) -> usize {
        self.0
    }
}

/// Failure report delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Collector endpoint. A missing scheme means `http://`.
    #[serde(default)]
    pub url: String,

    /// Delivery timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: default_timeout(),
        }
    }
}

/// Settings for all check kinds
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChecksConfig {
    /// ICMP ping
    pub icmp: CheckConfig,

    /// TCP/HTTP reachability
    pub tcp: CheckConfig,

    /// Traceroute
    pub trace: CheckConfig,
}

/// Settings for one check kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckConfig {
    /// Whether the check runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay between the end of one probe and the start of the next
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Hosts for this check only, replacing the shared list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<HostList>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_interval(),
            hosts: None,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("report:\n  url: collector:8080\n");

        assert!(config.hosts.is_empty());
        assert_eq!(config.response_timeout, Duration::from_secs(5));
        assert_eq!(config.max_threads.get(), DEFAULT_MAX_THREADS);
        assert_eq!(config.report.timeout, Duration::from_secs(5));
        for kind in CheckKind::ALL {
            assert!(config.check(kind).enabled);
            assert_eq!(config.check(kind).interval, Duration::from_secs(5));
        }
        assert_eq!(config.observability.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_hosts_as_joined_string() {
        let config = parse("hosts: \"a.example; 10.0.0.1;;\"\n");
        assert_eq!(config.hosts.as_slice(), ["a.example", "10.0.0.1"]);
    }

    #[test]
    fn test_hosts_as_list_keeps_order_and_duplicates() {
        let config = parse("hosts: [b, a, b]\n");
        assert_eq!(config.hosts.as_slice(), ["b", "a", "b"]);
    }

    #[test]
    fn test_max_threads_lenient() {
        assert_eq!(parse("max_threads: 4\n").max_threads.get(), 4);
        assert_eq!(parse("max_threads: \"8\"\n").max_threads.get(), 8);
        assert_eq!(parse("max_threads: 0\n").max_threads.get(), DEFAULT_MAX_THREADS);
        assert_eq!(parse("max_threads: -3\n").max_threads.get(), DEFAULT_MAX_THREADS);
        assert_eq!(parse("max_threads: lots\n").max_threads.get(), DEFAULT_MAX_THREADS);
    }

    #[test]
    fn test_per_check_hosts_override() {
        let config = parse(
            "hosts: [a, b]\nchecks:\n  trace:\n    hosts: \"c\"\n    interval: 30s\n",
        );

        assert_eq!(config.host_names(CheckKind::Icmp), ["a", "b"]);
        assert_eq!(config.host_names(CheckKind::Traceroute), ["c"]);

        let spec = config.schedule_spec(CheckKind::Traceroute).unwrap();
        assert_eq!(spec.hosts().len(), 1);
        assert_eq!(spec.interval(), Duration::from_secs(30));
        assert_eq!(spec.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_enabled_checks() {
        let config = parse("checks:\n  icmp:\n    enabled: false\n");
        assert_eq!(
            config.enabled_checks(),
            vec![CheckKind::Tcp, CheckKind::Traceroute]
        );
    }

    #[test]
    fn test_schedule_spec_rejects_blank_host() {
        let config = parse("hosts: [a, \"  \"]\n");
        assert!(config.schedule_spec(CheckKind::Tcp).is_err());
    }

    #[test]
    fn test_schedule_spec_rejects_empty_hosts() {
        let config = parse("report:\n  url: x\n");
        assert!(config.schedule_spec(CheckKind::Icmp).is_err());
    }

    #[test]
    fn test_log_format_json() {
        let config = parse("observability:\n  logging:\n    level: debug\n    format: json\n");
        assert_eq!(config.observability.logging.level, "debug");
        assert_eq!(config.observability.logging.format, LogFormat::Json);
    }
}
