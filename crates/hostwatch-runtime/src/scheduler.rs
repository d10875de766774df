//! Periodic probe scheduling
//!
//! Every (probe, host) pair runs in its own task on a fixed-delay loop:
//! the next execution starts `interval` after the previous one finished, so
//! executions of the same pair never overlap. Errors and panics from one
//! execution are contained in that task and never reach other tasks.

use crate::dispatch::Dispatcher;
use crate::shutdown::ShutdownSignal;
use crate::worker::WorkerPool;
use futures::FutureExt;
use hostwatch_core::{CheckKind, Host, Result, ScheduleSpec};
use hostwatch_probe::Probe;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

/// Execution counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Probe executions started
    pub executions: u64,
    /// Executions that produced a successful outcome
    pub successes: u64,
    /// Executions that produced a failed outcome
    pub failures: u64,
    /// Executions that ended in an error instead of an outcome
    pub probe_errors: u64,
    /// Executions that panicked
    pub panics: u64,
}

#[derive(Debug, Default)]
struct StatsTracker {
    executions: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    probe_errors: AtomicU64,
    panics: AtomicU64,
}

impl StatsTracker {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            executions: self.executions.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            probe_errors: self.probe_errors.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct ScheduledTask {
    kind: CheckKind,
    host: Host,
    handle: JoinHandle<()>,
}

/// Owns every periodic probe task
#[derive(Debug)]
pub struct Scheduler {
    pool: WorkerPool,
    dispatcher: Arc<Dispatcher>,
    shutdown: ShutdownSignal,
    stats: Arc<StatsTracker>,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Create a scheduler with no tasks
    pub fn new(pool: WorkerPool, dispatcher: Dispatcher) -> Self {
        Self {
            pool,
            dispatcher: Arc::new(dispatcher),
            shutdown: ShutdownSignal::new(),
            stats: Arc::new(StatsTracker::default()),
            tasks: Vec::new(),
        }
    }

    /// Start one repeating task per host in `spec`. The first execution of
    /// each task begins immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, probe: Arc<dyn Probe>, spec: &ScheduleSpec) {
        let kind = probe.kind();
        info!(
            kind = %kind,
            hosts = spec.hosts().len(),
            interval_ms = spec.interval().as_millis(),
            "Scheduling checks"
        );

        for host in spec.hosts() {
            let task = Task {
                probe: Arc::clone(&probe),
                host: host.clone(),
                interval: spec.interval(),
                pool: self.pool.clone(),
                dispatcher: Arc::clone(&self.dispatcher),
                shutdown: self.shutdown.clone(),
                stats: Arc::clone(&self.stats),
            };

            let span = tracing::info_span!("check", kind = %kind, host = %host);
            let handle = tokio::spawn(task.run().instrument(span));

            self.tasks.push(ScheduledTask {
                kind,
                host: host.clone(),
                handle,
            });
        }
    }

    /// Number of scheduled tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Current execution counters
    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot()
    }

    /// Signal that stops every task when triggered
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Stop all tasks and wait for them to finish.
    ///
    /// Idle tasks stop right away. Tasks with a probe in flight get until
    /// `grace` elapses, after which they are aborted.
    pub async fn shutdown(self, grace: Duration) -> SchedulerStats {
        self.shutdown.trigger();
        info!(
            tasks = self.tasks.len(),
            grace_ms = grace.as_millis(),
            "Stopping scheduled checks"
        );

        let deadline = tokio::time::Instant::now() + grace;
        let mut aborted = 0usize;

        for mut task in self.tasks {
            match tokio::time::timeout_at(deadline, &mut task.handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(
                        kind = %task.kind,
                        host = %task.host,
                        error = %e,
                        "Check task ended abnormally"
                    );
                }
                Err(_) => {
                    task.handle.abort();
                    let _ = task.handle.await;
                    aborted += 1;
                    debug!(kind = %task.kind, host = %task.host, "Check task aborted");
                }
            }
        }

        if aborted > 0 {
            warn!(aborted = aborted, "Aborted checks still running after grace period");
        }

        let stats = self.stats.snapshot();
        info!(
            executions = stats.executions,
            successes = stats.successes,
            failures = stats.failures,
            probe_errors = stats.probe_errors,
            panics = stats.panics,
            "Scheduler stopped"
        );
        stats
    }
}

struct Task {
    probe: Arc<dyn Probe>,
    host: Host,
    interval: Duration,
    pool: WorkerPool,
    dispatcher: Arc<Dispatcher>,
    shutdown: ShutdownSignal,
    stats: Arc<StatsTracker>,
}

impl Task {
    async fn run(self) {
        loop {
            let permit = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                permit = self.pool.acquire() => permit,
            };

            let permit = match permit {
                Ok(permit) => permit,
                Err(e) => {
                    error!(error = %e, "Cannot acquire worker slot, stopping check");
                    break;
                }
            };

            self.stats.executions.fetch_add(1, Ordering::Relaxed);

            let execution = AssertUnwindSafe(self.execute(permit)).catch_unwind().await;
            match execution {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.stats.probe_errors.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "Check execution failed");
                }
                Err(panic) => {
                    self.stats.panics.fetch_add(1, Ordering::Relaxed);
                    error!(panic = %panic_message(panic.as_ref()), "Check execution panicked");
                }
            }

            tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!("Check stopped");
    }

    async fn execute(&self, permit: tokio::sync::OwnedSemaphorePermit) -> Result<()> {
        let outcome = self.probe.ping(&self.host).await;
        drop(permit);
        let outcome = outcome?;

        if outcome.is_successful() {
            self.stats.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
        }

        debug!(successful = outcome.is_successful(), "Probe finished");
        self.dispatcher
            .dispatch(self.probe.kind(), &self.host, outcome)
            .await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
