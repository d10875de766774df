//! Outcome classification and dispatch

use hostwatch_core::{CheckKind, Host, Outcome, OutcomePayload, Result};
use hostwatch_notify::Notifier;
use hostwatch_store::ResultStore;
use std::sync::Arc;
use tracing::debug;

/// Whether an outcome must be reported to the notifier.
///
/// Failed ICMP and TCP outcomes notify. Traceroute outcomes never do.
pub fn requires_notification(outcome: &Outcome) -> bool {
    if outcome.is_successful() {
        return false;
    }

    match outcome.payload() {
        OutcomePayload::Icmp { .. } | OutcomePayload::Tcp { .. } => true,
        OutcomePayload::Traceroute { .. } => false,
    }
}

/// Records every outcome and notifies on reportable failures
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: ResultStore,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    /// Create a dispatcher over `store` reporting through `notifier`
    pub fn new(store: ResultStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Store the dispatcher records into
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Record `outcome` under the `kind` check for `host`, then notify if it
    /// is a reportable failure.
    ///
    /// The store is updated before the notifier runs, so the report sent for
    /// a failure already contains it. An outcome that does not belong to
    /// `(kind, host)` is rejected and nothing is notified.
    pub async fn dispatch(&self, kind: CheckKind, host: &Host, outcome: Outcome) -> Result<()> {
        let notify = requires_notification(&outcome);

        self.store.record(kind, host, outcome)?;

        if notify {
            debug!(host = %host, kind = %kind, "Reportable failure, notifying");
            self.notifier.notify(host).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingNotifier;
    use hostwatch_core::Error;
    use std::time::Duration;

    fn host(name: &str) -> Host {
        Host::new(name).unwrap()
    }

    #[test]
    fn test_requires_notification_policy() {
        let h = host("h1");

        assert!(requires_notification(&Outcome::icmp(false, h.clone(), vec![])));
        assert!(requires_notification(&Outcome::tcp_failure(h.clone())));
        assert!(!requires_notification(&Outcome::traceroute(false, h.clone(), vec![])));

        assert!(!requires_notification(&Outcome::icmp(true, h.clone(), vec![])));
        assert!(!requires_notification(&Outcome::tcp_success(
            h.clone(),
            Duration::from_millis(12),
            200
        )));
        assert!(!requires_notification(&Outcome::traceroute(true, h, vec![])));
    }

    #[tokio::test]
    async fn test_dispatch_failure_records_then_notifies() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::new();
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier.clone()));
        let h1 = host("h1");

        dispatcher
            .dispatch(
                CheckKind::Icmp,
                &h1,
                Outcome::icmp(false, h1.clone(), vec!["Error: x".into()]),
            )
            .await
            .unwrap();

        assert_eq!(notifier.count_for("h1"), 1);
        let stored = store.read(CheckKind::Icmp, "h1").unwrap();
        assert!(!stored.is_successful());
    }

    #[tokio::test]
    async fn test_dispatch_success_records_without_notifying() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::new();
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier.clone()));
        let h1 = host("h1");

        dispatcher
            .dispatch(
                CheckKind::Tcp,
                &h1,
                Outcome::tcp_success(h1.clone(), Duration::from_millis(5), 204),
            )
            .await
            .unwrap();

        assert_eq!(notifier.total(), 0);
        assert!(store.read(CheckKind::Tcp, "h1").unwrap().is_successful());
    }

    #[tokio::test]
    async fn test_dispatch_traceroute_failure_never_notifies() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::new();
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier.clone()));
        let h1 = host("h1");

        for _ in 0..3 {
            dispatcher
                .dispatch(
                    CheckKind::Traceroute,
                    &h1,
                    Outcome::traceroute(false, h1.clone(), vec!["* * *".into()]),
                )
                .await
                .unwrap();
        }

        assert_eq!(notifier.total(), 0);
        assert!(store.read(CheckKind::Traceroute, "h1").is_some());
    }

    #[tokio::test]
    async fn test_notifier_sees_recorded_failure() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::observing(store.clone());
        let dispatcher = Dispatcher::new(store, Arc::new(notifier.clone()));
        let h1 = host("h1");

        dispatcher
            .dispatch(CheckKind::Tcp, &h1, Outcome::tcp_failure(h1.clone()))
            .await
            .unwrap();

        assert_eq!(notifier.seen_tcp_failures(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_outcome_of_other_kind() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::new();
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier.clone()));
        let h1 = host("h1");

        let result = dispatcher
            .dispatch(
                CheckKind::Traceroute,
                &h1,
                Outcome::icmp(false, h1.clone(), vec![]),
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(notifier.total(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_rejects_outcome_for_other_host() {
        let store = ResultStore::new();
        let notifier = CountingNotifier::new();
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier.clone()));

        let result = dispatcher
            .dispatch(CheckKind::Tcp, &host("h1"), Outcome::tcp_failure(host("h2")))
            .await;

        assert!(result.is_err());
        assert_eq!(notifier.total(), 0);
        assert!(store.is_empty());
    }
}
