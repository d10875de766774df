//! HTTP reachability probe over TCP

use crate::probe::{bounded, Probe};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use hostwatch_core::{CheckKind, Host, Outcome, OutcomePayload, Result};
use http::{Method, Uri};
use http_body_util::Empty;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Probe that sends `HEAD http://<host>` and treats any response as reachable
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout_duration: Duration,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpProbe {
    /// Create a new HTTP probe
    pub fn new(timeout_duration: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .http1_title_case_headers(true)
            .build_http();

        Self {
            timeout_duration,
            client,
        }
    }

    fn target(host: &Host) -> String {
        let name = host.as_str();
        if name.starts_with("http://") {
            name.to_string()
        } else {
            format!("http://{}", name)
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::Tcp
    }

    async fn ping(&self, host: &Host) -> Result<Outcome> {
        let observed_at = Utc::now();
        let start = Instant::now();
        let url = Self::target(host);

        debug!(url = %url, "Performing TCP probe");

        let uri: Uri = match url.parse() {
            Ok(u) => u,
            Err(e) => {
                warn!(url = %url, error = %e, "TCP probe failed: invalid URL");
                return Ok(failure_at(host, observed_at));
            }
        };

        let req = match http::Request::builder()
            .method(Method::HEAD)
            .uri(uri)
            .body(Empty::<Bytes>::new())
        {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "TCP probe failed: could not build request");
                return Ok(failure_at(host, observed_at));
            }
        };

        match bounded(self.timeout_duration, self.client.request(req)).await {
            Some(Ok(response)) => {
                let status = response.status();
                let elapsed = start.elapsed();
                debug!(
                    url = %url,
                    status = %status,
                    elapsed_ms = elapsed.as_millis(),
                    "TCP probe passed"
                );
                Ok(Outcome::new(
                    true,
                    host.clone(),
                    observed_at,
                    OutcomePayload::Tcp {
                        elapsed: Some(elapsed),
                        response_code: Some(status.as_u16()),
                    },
                ))
            }
            Some(Err(e)) => {
                warn!(url = %url, error = %e, "TCP probe failed: request error");
                Ok(failure_at(host, observed_at))
            }
            None => {
                warn!(
                    url = %url,
                    timeout_ms = self.timeout_duration.as_millis(),
                    "TCP probe failed: timeout"
                );
                Ok(failure_at(host, observed_at))
            }
        }
    }
}

fn failure_at(host: &Host, observed_at: chrono::DateTime<Utc>) -> Outcome {
    Outcome::new(
        false,
        host.clone(),
        observed_at,
        OutcomePayload::Tcp {
            elapsed: None,
            response_code: None,
        },
    )
}
