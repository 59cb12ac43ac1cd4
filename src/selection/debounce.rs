//! Debouncing of selection-change events
//!
//! Rapid successive events cancel any pending emission; only the most recent
//! value is delivered once the quiet period elapses.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct SelectionDebouncer<T> {
    delay: Duration,
    sender: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> SelectionDebouncer<T> {
    /// Create a debouncer and the receiver its settled values arrive on.
    /// Must be used inside a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            sender,
            pending: None,
        };
        (debouncer, receiver)
    }

    /// Schedule `value`, replacing whatever was pending
    pub fn push(&mut self, value: T) {
        self.cancel();

        let sender = self.sender.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(value).is_err() {
                tracing::debug!("Selection receiver dropped, discarding settled selection");
            }
        }));
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for SelectionDebouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    const DELAY: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_value_fires() {
        let (mut debouncer, mut rx) = SelectionDebouncer::new(DELAY);

        debouncer.push("first");
        sleep(Duration::from_millis(50)).await;
        debouncer.push("second");
        sleep(Duration::from_millis(50)).await;
        debouncer.push("third");

        assert_eq!(rx.recv().await, Some("third"));
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_all_fire() {
        let (mut debouncer, mut rx) = SelectionDebouncer::new(DELAY);

        debouncer.push(1);
        sleep(Duration::from_millis(300)).await;
        debouncer.push(2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let (mut debouncer, mut rx) = SelectionDebouncer::new(DELAY);

        debouncer.push("gone");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        assert!(timeout(Duration::from_secs(1), rx.recv()).await.is_err());
    }
}
