//! Process wide shutdown signal.
//!
//! A [`ShutdownTrigger`] flips the signal once; any number of [`Shutdown`]
//! handles observe it. Pending rate reads race against [`Shutdown::cancelled`]
//! so an in-flight scan winds down instead of waiting on the network.

use tokio::sync::watch;

/// Sending half of the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    /// Flipped to `true` exactly once
    tx: watch::Sender<bool>,
}

/// Receiving half of the shutdown signal
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Current state of the signal
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger/handle pair
#[must_use]
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    /// Signal shutdown to every handle
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    /// A handle that never fires. Used when no shutdown wiring is needed, e.g. in tests.
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender leaves the value at `false` forever
        drop(tx);
        Self { rx }
    }

    /// Whether shutdown has been signalled
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is signalled. Never resolves if the trigger was
    /// dropped without firing.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_all_handles() {
        let (trigger, shutdown) = channel();
        let mut a = shutdown.clone();
        let mut b = shutdown;

        trigger.trigger();

        a.cancelled().await;
        b.cancelled().await;
        assert!(a.is_triggered());
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let mut shutdown = Shutdown::never();
        let fired = tokio::time::timeout(Duration::from_millis(20), shutdown.cancelled()).await;
        assert!(fired.is_err());
        assert!(!shutdown.is_triggered());
    }
}
