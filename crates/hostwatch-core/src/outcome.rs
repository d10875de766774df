//! Immutable probe outcomes

use crate::error::Result;
use crate::types::{CheckKind, Host};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Check-specific data carried by an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomePayload {
    /// Output lines of the `ping` command
    Icmp {
        /// Non-blank, trimmed output lines
        lines: Vec<String>,
    },
    /// HTTP reachability result. Both fields are `None` on failure.
    Tcp {
        /// Round-trip time of the request
        elapsed: Option<Duration>,
        /// HTTP status code of the response
        response_code: Option<u16>,
    },
    /// Output lines of the `traceroute` command
    Traceroute {
        /// Non-blank, trimmed output lines
        lines: Vec<String>,
    },
}

impl OutcomePayload {
    /// Check kind this payload belongs to
    pub fn kind(&self) -> CheckKind {
        match self {
            OutcomePayload::Icmp { .. } => CheckKind::Icmp,
            OutcomePayload::Tcp { .. } => CheckKind::Tcp,
            OutcomePayload::Traceroute { .. } => CheckKind::Traceroute,
        }
    }
}

/// Result of exactly one probe execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    successful: bool,
    host: Host,
    observed_at: DateTime<Utc>,
    payload: OutcomePayload,
}

impl Outcome {
    /// Create an outcome observed at the given time
    pub fn new(
        successful: bool,
        host: Host,
        observed_at: DateTime<Utc>,
        payload: OutcomePayload,
    ) -> Self {
        Self {
            successful,
            host,
            observed_at,
            payload,
        }
    }

    /// ICMP outcome observed now
    pub fn icmp(successful: bool, host: Host, lines: Vec<String>) -> Self {
        Self::new(successful, host, Utc::now(), OutcomePayload::Icmp { lines })
    }

    /// Traceroute outcome observed now
    pub fn traceroute(successful: bool, host: Host, lines: Vec<String>) -> Self {
        Self::new(
            successful,
            host,
            Utc::now(),
            OutcomePayload::Traceroute { lines },
        )
    }

    /// Successful TCP outcome observed now
    pub fn tcp_success(host: Host, elapsed: Duration, response_code: u16) -> Self {
        Self::new(
            true,
            host,
            Utc::now(),
            OutcomePayload::Tcp {
                elapsed: Some(elapsed),
                response_code: Some(response_code),
            },
        )
    }

    /// Failed TCP outcome observed now
    pub fn tcp_failure(host: Host) -> Self {
        Self::new(
            false,
            host,
            Utc::now(),
            OutcomePayload::Tcp {
                elapsed: None,
                response_code: None,
            },
        )
    }

    /// Whether the host was reachable
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Probed host
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// When the probe execution started
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Check-specific data
    pub fn payload(&self) -> &OutcomePayload {
        &self.payload
    }

    /// Check kind that produced this outcome
    pub fn kind(&self) -> CheckKind {
        self.payload.kind()
    }

    /// Compact single-line JSON rendering used in reports
    pub fn render(&self) -> Result<String> {
        let mut view = RenderedOutcome {
            is_successful: self.successful,
            host: self.host.as_str(),
            time_stamp: self.observed_at.timestamp_millis(),
            result_lines: None,
            response_time_millis: None,
            response_code: None,
        };

        match &self.payload {
            OutcomePayload::Icmp { lines } | OutcomePayload::Traceroute { lines } => {
                view.result_lines = Some(lines.as_slice());
            }
            OutcomePayload::Tcp {
                elapsed,
                response_code,
            } => {
                view.response_time_millis = elapsed.map(|d| d.as_millis() as u64);
                view.response_code = *response_code;
            }
        }

        Ok(serde_json::to_string(&view)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderedOutcome<'a> {
    is_successful: bool,
    host: &'a str,
    time_stamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_lines: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_millis: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_code: Option<u16>,
}
