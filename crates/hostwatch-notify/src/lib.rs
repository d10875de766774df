//! # Hostwatch Notify
//!
//! Report rendering and failure notification:
//! - Per-host JSON reports built from the result store
//! - The [`Notifier`] capability used by the scheduler
//! - HTTP delivery of reports to a collector endpoint

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod notifier;
pub mod report;

pub use notifier::{HttpNotifier, Notifier, REPORT_CONTENT_TYPE};
pub use report::{Report, ReportBuilder, NOT_AVAILABLE};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::notifier::{HttpNotifier, Notifier};
    pub use crate::report::{Report, ReportBuilder};
}
