//! Debouncing of input changes before re-planning.
//!
//! Values pushed in quick succession collapse into the last one, which is
//! released once nothing newer has arrived for the configured delay.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Quiet period before a pending value is released.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Sending half of a debounce pipeline.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the debounce task on the current tokio runtime.
    ///
    /// Returns the debouncer and a receiver of settled values. Dropping
    /// every debouncer flushes the pending value, then closes the receiver.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut pending) = mpsc::unbounded_channel::<T>();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(mut latest) = pending.recv().await {
                loop {
                    tokio::select! {
                        next = pending.recv() => match next {
                            Some(value) => latest = value,
                            None => {
                                let _ = settled_tx.send(latest);
                                return;
                            }
                        },
                        _ = sleep(delay) => {
                            if settled_tx.send(latest).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { input }, settled_rx)
    }

    /// Queue a value, replacing anything still waiting. Returns `false` once
    /// the pipeline has shut down.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_releases_latest_only() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_millis(500));

        debouncer.push("a");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("b");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("c");

        assert_eq!(settled.recv().await, Some("c"));

        drop(debouncer);
        assert_eq!(settled.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_release() {
        let (debouncer, mut settled) = Debouncer::spawn(DEFAULT_DEBOUNCE);

        debouncer.push(1);
        assert_eq!(settled.recv().await, Some(1));

        sleep(Duration::from_millis(600)).await;
        debouncer.push(2);
        assert_eq!(settled.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending_value() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_secs(10));
        debouncer.push("draft");
        drop(debouncer);

        assert_eq!(settled.recv().await, Some("draft"));
        assert_eq!(settled.recv().await, None);
    }
}
