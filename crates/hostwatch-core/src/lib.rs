//! # Hostwatch Core
//!
//! Core types and error handling shared by every hostwatch crate:
//! - Hosts and check kinds
//! - Immutable probe outcomes
//! - Schedule specifications
//! - Error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod outcome;
pub mod types;

pub use error::{Error, Result};
pub use outcome::{Outcome, OutcomePayload};
pub use types::{CheckKind, Host, ScheduleSpec};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::outcome::{Outcome, OutcomePayload};
    pub use crate::types::{CheckKind, Host, ScheduleSpec};
}
