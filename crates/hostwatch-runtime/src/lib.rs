//! # Hostwatch Runtime
//!
//! Scheduling and lifecycle management:
//! - Fixed-delay probe tasks, one per (probe, host)
//! - Outcome dispatch into the result store and notifier
//! - Worker pool sizing
//! - Graceful shutdown

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod dispatch;
pub mod scheduler;
pub mod shutdown;
pub mod worker;

#[cfg(test)]
mod testing;

pub use dispatch::{requires_notification, Dispatcher};
pub use scheduler::{Scheduler, SchedulerStats};
pub use shutdown::{ShutdownSignal, SignalHandler};
pub use worker::{pool_size, WorkerConfig, WorkerPool, DEFAULT_MAX_THREADS, MAX_THREADS_LIMIT};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dispatch::Dispatcher;
    pub use crate::scheduler::{Scheduler, SchedulerStats};
    pub use crate::shutdown::{ShutdownSignal, SignalHandler};
    pub use crate::worker::{WorkerConfig, WorkerPool};
}
