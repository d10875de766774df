//! Per-host reports

use hostwatch_core::{CheckKind, Error, Host, Result};
use hostwatch_store::ResultStore;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Placeholder for a check kind that never recorded an outcome for the host
pub const NOT_AVAILABLE: &str = "N/A";

/// Latest known state of one host across all check kinds.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Reported host
    pub host: String,
    /// Rendered ICMP outcome
    pub icmp_ping: String,
    /// Rendered TCP outcome
    pub tcp_ping: String,
    /// Rendered traceroute outcome
    pub trace: String,
}

impl Report {
    /// Pretty-printed JSON with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| Error::Internal(format!("report is not UTF-8: {}", e)))
    }
}

/// Builds reports from the shared result store
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    store: ResultStore,
}

impl ReportBuilder {
    /// Create a report builder reading from `store`
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }

    /// Snapshot the host's latest outcomes
    pub fn build(&self, host: &Host) -> Result<Report> {
        Ok(Report {
            host: host.to_string(),
            icmp_ping: self.rendered(CheckKind::Icmp, host)?,
            tcp_ping: self.rendered(CheckKind::Tcp, host)?,
            trace: self.rendered(CheckKind::Traceroute, host)?,
        })
    }

    /// Build and serialize the host's report
    pub fn render(&self, host: &Host) -> Result<String> {
        self.build(host)?.to_json()
    }

    fn rendered(&self, kind: CheckKind, host: &Host) -> Result<String> {
        match self.store.read(kind, host.as_str()) {
            Some(outcome) => outcome.render(),
            None => Ok(NOT_AVAILABLE.to_string()),
        }
    }
}
