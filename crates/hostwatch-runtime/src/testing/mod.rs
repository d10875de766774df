//! Mock probes and notifiers for scheduler tests

use async_trait::async_trait;
use hostwatch_core::{CheckKind, Error, Host, Outcome, Result};
use hostwatch_notify::Notifier;
use hostwatch_probe::Probe;
use hostwatch_store::ResultStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What a [`MockProbe`] does for a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Succeed,
    Fail,
    Error,
    Panic,
}

/// One recorded probe invocation
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub(crate) host: Host,
    pub(crate) started: Instant,
    pub(crate) finished: Instant,
}

/// Probe with scripted per-host behavior and an optional delay
#[derive(Debug, Clone)]
pub(crate) struct MockProbe {
    kind: CheckKind,
    produces: CheckKind,
    default: Behavior,
    overrides: HashMap<String, Behavior>,
    delay: Duration,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockProbe {
    pub(crate) fn new(kind: CheckKind, default: Behavior) -> Self {
        Self {
            kind,
            produces: kind,
            default,
            overrides: HashMap::new(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_host(mut self, host: &str, behavior: Behavior) -> Self {
        self.overrides.insert(host.to_string(), behavior);
        self
    }

    /// Report `kind()` as usual but return outcomes of `produces`
    pub(crate) fn producing(mut self, produces: CheckKind) -> Self {
        self.produces = produces;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_for(&self, host: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.host.as_str() == host)
            .cloned()
            .collect()
    }

    fn behavior(&self, host: &Host) -> Behavior {
        self.overrides
            .get(host.as_str())
            .copied()
            .unwrap_or(self.default)
    }
}

/// Outcome of `kind` for `host` with the given result
pub(crate) fn outcome_for(kind: CheckKind, host: &Host, successful: bool) -> Outcome {
    match kind {
        CheckKind::Icmp => Outcome::icmp(successful, host.clone(), vec!["mock".to_string()]),
        CheckKind::Tcp if successful => {
            Outcome::tcp_success(host.clone(), Duration::from_millis(1), 200)
        }
        CheckKind::Tcp => Outcome::tcp_failure(host.clone()),
        CheckKind::Traceroute => {
            Outcome::traceroute(successful, host.clone(), vec!["mock".to_string()])
        }
    }
}

#[async_trait]
impl Probe for MockProbe {
    fn kind(&self) -> CheckKind {
        self.kind
    }

    async fn ping(&self, host: &Host) -> Result<Outcome> {
        let started = Instant::now();
        let behavior = self.behavior(host);

        if behavior == Behavior::Panic {
            self.calls.lock().push(Call {
                host: host.clone(),
                started,
                finished: started,
            });
            panic!("mock probe panicked for {}", host);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.calls.lock().push(Call {
            host: host.clone(),
            started,
            finished: Instant::now(),
        });

        match behavior {
            Behavior::Succeed => Ok(outcome_for(self.produces, host, true)),
            Behavior::Fail => Ok(outcome_for(self.produces, host, false)),
            Behavior::Error => Err(Error::probe(self.kind, host.as_str(), "mock error")),
            Behavior::Panic => unreachable!(),
        }
    }
}

/// Notifier counting calls per host
#[derive(Debug, Clone, Default)]
pub(crate) struct CountingNotifier {
    calls: Arc<Mutex<Vec<Host>>>,
    store: Option<ResultStore>,
    seen_tcp_failures: Arc<AtomicUsize>,
}

impl CountingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Also inspect `store` on every call, counting recorded TCP failures
    pub(crate) fn observing(store: ResultStore) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.calls.lock().len()
    }

    pub(crate) fn count_for(&self, host: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|h| h.as_str() == host)
            .count()
    }

    pub(crate) fn seen_tcp_failures(&self) -> usize {
        self.seen_tcp_failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, host: &Host) {
        if let Some(store) = &self.store {
            if let Some(outcome) = store.read(CheckKind::Tcp, host.as_str()) {
                if !outcome.is_successful() {
                    self.seen_tcp_failures.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
        self.calls.lock().push(host.clone());
    }
}
