//! Probe capability

use crate::process::ProcessProbe;
use crate::tcp::HttpProbe;
use async_trait::async_trait;
use hostwatch_core::{CheckKind, Host, Outcome, Result};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A reachability check against a single host
#[async_trait]
pub trait Probe: Send + Sync + fmt::Debug {
    /// Check kind whose table this probe's outcomes belong to
    fn kind(&self) -> CheckKind;

    /// Probe `host` once.
    ///
    /// Unreachable hosts produce a failed [`Outcome`]. `Err` is reserved for
    /// conditions the probe cannot describe as an outcome.
    async fn ping(&self, host: &Host) -> Result<Outcome>;
}

/// Build the default probe for a check kind
pub fn build_probe(kind: CheckKind, timeout: Duration) -> Arc<dyn Probe> {
    match kind {
        CheckKind::Icmp => Arc::new(ProcessProbe::icmp(timeout)),
        CheckKind::Tcp => Arc::new(HttpProbe::new(timeout)),
        CheckKind::Traceroute => Arc::new(ProcessProbe::traceroute(timeout)),
    }
}

/// Await `future` for at most `limit`. A zero limit waits indefinitely.
pub(crate) async fn bounded<F: Future>(limit: Duration, future: F) -> Option<F::Output> {
    if limit.is_zero() {
        return Some(future.await);
    }
    tokio::time::timeout(limit, future).await.ok()
}
