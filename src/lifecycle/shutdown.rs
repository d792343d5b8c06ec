//! Stop request shared by the signal listener and the daily scheduler.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of the stop flag. Cloned into the signal listener.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request a stop. Later subscribers observe it too.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of the stop flag.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolves once a stop is requested, immediately if it already was.
    pub async fn requested(&mut self) {
        let stopped = self.rx.wait_for(|stop| *stop).await.is_ok();
        if !stopped {
            // Every `Shutdown` is gone, so no stop can arrive.
            std::future::pending::<()>().await;
        }
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_listener() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.clone().subscribe();
        assert!(!a.is_requested());

        shutdown.trigger();
        a.requested().await;
        b.requested().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        assert!(late.is_requested());
        late.requested().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_trigger_never_resolves() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        let waited = tokio::time::timeout(Duration::from_secs(60), signal.requested()).await;
        assert!(waited.is_err());
    }
}
