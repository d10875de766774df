//! Worker pool sizing and probe concurrency limits

use hostwatch_core::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Upper bound used when `max_threads` is unset or unusable
pub const DEFAULT_MAX_THREADS: usize = 16;

/// Hard ceiling for `max_threads`
pub const MAX_THREADS_LIMIT: usize = 256;

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Upper bound on concurrent probe executions (0 = default)
    pub max_threads: usize,

    /// Thread name prefix for runtime workers
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
            thread_name: "hostwatch-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Pool size for this configuration: twice the CPU count, capped by
    /// `max_threads`
    pub fn pool_size(&self) -> usize {
        pool_size(num_cpus::get(), self.max_threads)
    }
}

/// Compute the pool size for `cpus` logical CPUs under `max_threads`.
///
/// A zero `max_threads` falls back to [`DEFAULT_MAX_THREADS`]; larger values
/// are clamped to [`MAX_THREADS_LIMIT`].
pub fn pool_size(cpus: usize, max_threads: usize) -> usize {
    let max_threads = match max_threads {
        0 => {
            tracing::warn!(
                default = DEFAULT_MAX_THREADS,
                "max_threads must be positive, using default"
            );
            DEFAULT_MAX_THREADS
        }
        n if n > MAX_THREADS_LIMIT => {
            tracing::warn!(
                requested = n,
                limit = MAX_THREADS_LIMIT,
                "max_threads above limit, clamping"
            );
            MAX_THREADS_LIMIT
        }
        n => n,
    };

    cpus.max(1).saturating_mul(2).min(max_threads)
}

/// Bounded pool of probe execution slots.
///
/// The pool shares the surrounding Tokio runtime; each probe execution holds
/// one permit while it runs.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    size: usize,
    thread_name: String,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Create a new worker pool
    pub fn new(config: WorkerConfig) -> Result<Self> {
        Self::with_size(config.pool_size(), config.thread_name)
    }

    /// Create a pool with an explicit number of slots
    pub fn with_size(size: usize, thread_name: impl Into<String>) -> Result<Self> {
        if size == 0 {
            return Err(Error::Config("worker pool size must be positive".to_string()));
        }

        let thread_name = thread_name.into();
        tracing::info!(
            size = size,
            thread_name = %thread_name,
            "Worker pool configured"
        );

        Ok(Self {
            size,
            thread_name,
            permits: Arc::new(Semaphore::new(size)),
        })
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Thread name prefix for runtime workers
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Slots not currently held by a probe
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::Runtime("worker pool closed".to_string()))
    }
}
