//! Graceful shutdown with signal handling

use hostwatch_core::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;

#[derive(Debug)]
struct Inner {
    triggered: AtomicBool,
    sender: broadcast::Sender<()>,
}

/// Shutdown signal broadcaster
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                sender,
            }),
        }
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.sender.subscribe()
    }

    /// Trigger shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.inner.sender.send(());
        tracing::info!("Shutdown signal triggered");
    }

    /// Check if shutdown was triggered
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown is triggered, including when it already was
    pub async fn triggered(&self) {
        // Subscribe before checking the flag so a concurrent trigger is not missed
        let mut rx = self.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Signal handler for OS signals
#[derive(Debug)]
pub struct SignalHandler {
    signal: ShutdownSignal,
}

impl SignalHandler {
    /// Create a new signal handler
    pub fn new(signal: ShutdownSignal) -> Self {
        Self { signal }
    }

    /// Wait for SIGINT or SIGTERM (Ctrl+C elsewhere), then trigger shutdown
    pub async fn run(self) -> Result<()> {
        #[cfg(unix)]
        {
            use signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                _ = sigint.recv() => tracing::info!("Received SIGINT"),
                _ = self.signal.triggered() => return Ok(()),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                res = signal::ctrl_c() => {
                    res?;
                    tracing::info!("Received Ctrl+C");
                }
                _ = self.signal.triggered() => return Ok(()),
            }
        }

        self.signal.trigger();
        Ok(())
    }
}
