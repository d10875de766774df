//! Configuration validation

use crate::Config;
use hostwatch_core::{Error, Result};
use url::Url;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_report(config)?;
    validate_hosts(config)?;
    validate_checks(config);

    Ok(())
}

/// Collector URL with `http://` assumed when no scheme is given.
///
/// Only plain `http` is accepted; reports are delivered without TLS.
pub fn report_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Config("report.url is required".to_string()));
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| Error::Config(format!("Invalid report.url '{raw}': {e}")))?;

    if url.scheme() != "http" {
        return Err(Error::Config(format!(
            "report.url '{raw}' uses unsupported scheme '{}', only http is supported",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config(format!("report.url '{raw}' has no host")));
    }

    Ok(url)
}

fn validate_report(config: &Config) -> Result<()> {
    report_url(&config.report.url)?;

    if config.report.timeout.is_zero() {
        return Err(Error::Config("report.timeout must be > 0".to_string()));
    }

    Ok(())
}

fn validate_hosts(config: &Config) -> Result<()> {
    for kind in config.enabled_checks() {
        let hosts = config.host_names(kind);
        if hosts.is_empty() {
            return Err(Error::Config(format!(
                "no hosts configured for the {kind} check"
            )));
        }

        if hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(Error::Config(format!(
                "host names cannot be empty ({kind} check)"
            )));
        }
    }

    Ok(())
}

fn validate_checks(config: &Config) {
    let enabled = config.enabled_checks();
    if enabled.is_empty() {
        tracing::warn!("All checks are disabled, nothing will be probed");
    }

    for kind in enabled {
        if config.check(kind).interval.is_zero() {
            tracing::warn!(check = %kind, "Check interval is zero, probes will run back to back");
        }
    }

    if config.response_timeout.is_zero() {
        tracing::warn!("response_timeout is zero, probes will wait indefinitely");
    }
}
