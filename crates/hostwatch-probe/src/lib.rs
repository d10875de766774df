//! # Hostwatch Probes
//!
//! Reachability probes with:
//! - ICMP ping via the system `ping` command
//! - HTTP HEAD reachability over TCP
//! - Route tracing via the system `traceroute` command
//!
//! Ordinary network failures are reported as failed outcomes, never as errors.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod probe;
pub mod process;
pub mod tcp;

pub use probe::{build_probe, Probe};
pub use process::{
    icmp_command, icmp_succeeded, traceroute_command, traceroute_succeeded, CommandBuilder,
    OutputClassifier, ProcessKind, ProcessProbe,
};
pub use tcp::HttpProbe;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::probe::{build_probe, Probe};
    pub use crate::process::{ProcessKind, ProcessProbe};
    pub use crate::tcp::HttpProbe;
}
