//! # Hostwatch Result Store
//!
//! Last-value cache of probe outcomes keyed by check kind and host.
//!
//! Each check kind owns an independent sharded map, so writers for different
//! hosts or kinds never contend on a shared lock. Values are stored as
//! `Arc<Outcome>`, which makes every read and snapshot entry atomic: a reader
//! sees either the previous outcome or the new one.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

use dashmap::DashMap;
use hostwatch_core::{CheckKind, Error, Host, Outcome, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::trace;

type Table = DashMap<Host, Arc<Outcome>>;

#[derive(Debug, Default)]
struct Tables {
    icmp: Table,
    tcp: Table,
    traceroute: Table,
}

/// Shared handle to the most recent outcome per (check kind, host)
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    tables: Arc<Tables>,
}

impl ResultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: CheckKind) -> &Table {
        match kind {
            CheckKind::Icmp => &self.tables.icmp,
            CheckKind::Tcp => &self.tables.tcp,
            CheckKind::Traceroute => &self.tables.traceroute,
        }
    }

    /// Overwrite the stored outcome for `(kind, host)`.
    ///
    /// The outcome must be of `kind` and about `host`.
    pub fn record(&self, kind: CheckKind, host: &Host, outcome: Outcome) -> Result<()> {
        if outcome.kind() != kind {
            return Err(Error::validation(format!(
                "cannot record a {} outcome in the {} table",
                outcome.kind(),
                kind
            )));
        }

        if outcome.host() != host {
            return Err(Error::validation(format!(
                "cannot record an outcome for '{}' under '{}'",
                outcome.host(),
                host
            )));
        }

        trace!(
            kind = %kind,
            host = %host,
            successful = outcome.is_successful(),
            "Recording outcome"
        );

        self.table(kind).insert(host.clone(), Arc::new(outcome));
        Ok(())
    }

    /// Current outcome for `(kind, host)`, or `None` if never recorded
    pub fn read(&self, kind: CheckKind, host: &str) -> Option<Arc<Outcome>> {
        self.table(kind).get(host).map(|entry| Arc::clone(entry.value()))
    }

    /// Point-in-time view of one table. Each entry is read atomically; the
    /// view as a whole may interleave with concurrent writes.
    pub fn snapshot(&self, kind: CheckKind) -> HashMap<Host, Arc<Outcome>> {
        self.table(kind)
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// Number of hosts with a recorded outcome for `kind`
    pub fn len(&self, kind: CheckKind) -> usize {
        self.table(kind).len()
    }

    /// Whether no outcome has been recorded for any kind
    pub fn is_empty(&self) -> bool {
        CheckKind::ALL.iter().all(|kind| self.table(*kind).is_empty())
    }

    /// Every host with at least one recorded outcome, in sorted order
    pub fn hosts(&self) -> BTreeSet<Host> {
        CheckKind::ALL
            .iter()
            .flat_map(|kind| {
                self.table(*kind)
                    .iter()
                    .map(|entry| entry.key().clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
