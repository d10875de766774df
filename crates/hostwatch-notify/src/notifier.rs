//! Failure notification delivery

use crate::report::ReportBuilder;
use async_trait::async_trait;
use bytes::Bytes;
use hostwatch_core::{Error, Host, Result};
use http::{header, Method, Request, StatusCode, Uri};
use http_body_util::Full;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// Content type sent with every report
pub const REPORT_CONTENT_TYPE: &str = "application/json; utf-8";

/// Receives a host whose latest probe failed
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Report the host's current state. Delivery failures are handled here
    /// and never returned to the caller.
    async fn notify(&self, host: &Host);
}

/// Posts host reports to an HTTP collector
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    reports: ReportBuilder,
    destination: Uri,
    timeout_duration: Duration,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpNotifier {
    /// Create a notifier posting to `destination`. A destination without a
    /// scheme is treated as plain HTTP; any other scheme is rejected.
    pub fn new(
        reports: ReportBuilder,
        destination: &str,
        timeout_duration: Duration,
    ) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::Config("report destination must not be empty".to_string()));
        }

        let url = if destination.contains("://") {
            destination.to_string()
        } else {
            format!("http://{}", destination)
        };

        let destination: Uri = url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid report destination '{}': {}", url, e)))?;

        if destination.scheme_str() != Some("http") {
            return Err(Error::Config(format!(
                "Unsupported report destination scheme in '{}', only http is supported",
                url
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            reports,
            destination,
            timeout_duration,
            client,
        })
    }

    /// Destination the reports are posted to
    pub fn destination(&self) -> &Uri {
        &self.destination
    }

    /// Build the host's report and post it once
    pub async fn deliver(&self, host: &Host) -> Result<()> {
        let report = self.reports.render(host)?;
        info!(host = %host, destination = %self.destination, "Sending report");
        debug!(host = %host, report = %report, "Report body");

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.destination.clone())
            .header(header::CONTENT_TYPE, REPORT_CONTENT_TYPE)
            .body(Full::new(Bytes::from(report)))
            .map_err(|e| Error::Notification(format!("Failed to build request: {}", e)))?;

        let response = tokio::time::timeout(self.timeout_duration, self.client.request(req))
            .await
            .map_err(|_| {
                Error::Notification(format!(
                    "Request timed out after {}ms",
                    self.timeout_duration.as_millis()
                ))
            })?
            .map_err(|e| Error::Notification(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Notification(format!("Unexpected status: {}", status)));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, host: &Host) {
        match self.deliver(host).await {
            Ok(()) => debug!(host = %host, "Report successfully sent"),
            Err(e) => error!(host = %host, error = %e, "Failed to send report"),
        }
    }
}
