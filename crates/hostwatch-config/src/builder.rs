//! Configuration builder

use crate::types::{CheckConfig, Config, HostList, LogFormat, MaxThreads};
use hostwatch_core::{CheckKind, Result};
use std::time::Duration;

/// Builder for constructing configuration programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a host to the shared list
    pub fn host(mut self, host: impl Into<String>) -> Self {
        let mut hosts: Vec<String> = self.config.hosts.into();
        hosts.push(host.into());
        self.config.hosts = HostList::from(hosts);
        self
    }

    /// Set the collector endpoint
    pub fn report_url(mut self, url: impl Into<String>) -> Self {
        self.config.report.url = url.into();
        self
    }

    /// Set the per-attempt probe timeout
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Set the concurrency bound
    pub fn max_threads(mut self, n: usize) -> Self {
        self.config.max_threads = MaxThreads::new(n);
        self
    }

    /// Set the interval of one check
    pub fn interval(mut self, kind: CheckKind, interval: Duration) -> Self {
        self.check_mut(kind).interval = interval;
        self
    }

    /// Switch one check on or off
    pub fn enabled(mut self, kind: CheckKind, enabled: bool) -> Self {
        self.check_mut(kind).enabled = enabled;
        self
    }

    /// Set the log format
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.observability.logging.format = format;
        self
    }

    fn check_mut(&mut self, kind: CheckKind) -> &mut CheckConfig {
        match kind {
            CheckKind::Icmp => &mut self.config.checks.icmp,
            CheckKind::Tcp => &mut self.config.checks.tcp,
            CheckKind::Traceroute => &mut self.config.checks.trace,
        }
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<Config> {
        crate::validator::validate_config(&self.config)?;
        Ok(self.config)
    }
}
