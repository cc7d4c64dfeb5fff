//! Delayed delivery of assistant messages.
//!
//! Every reply is a tokio task that sleeps for the simulated typing delay and then runs
//! its delivery future. All tasks of one session hang off a single cancellation token:
//! closing the widget leaves them alone, tearing the session down cancels them.

use std::{
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, warn};

pub struct ReplyScheduler {
    token: CancellationToken,
    pending: Arc<AtomicUsize>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ReplyScheduler {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            pending: Arc::new(AtomicUsize::new(0)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Run `deliver` after `delay` unless the scheduler is cancelled first.
    ///
    /// Scheduled work is never superseded: two overlapping turns both deliver, in the
    /// order their timers expire.
    pub fn schedule<F>(&self, label: &'static str, delay: Duration, deliver: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.token.is_cancelled() {
            debug!(label, "scheduler cancelled, dropping delivery");
            return;
        }

        let token = self.token.child_token();
        let pending = PendingGuard::new(self.pending.clone());
        debug!(label, delay_ms = delay.as_millis() as u64, "delivery scheduled");

        let task = async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(label, "delivery cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    deliver.await;
                }
            }
            drop(pending);
        };
        let handle = tokio::spawn(task.instrument(Span::current()));

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of deliveries still waiting; drives the typing indicator
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel every pending delivery and refuse new ones
    pub fn cancel_all(&self) {
        if !self.token.is_cancelled() {
            debug!(pending = self.pending(), "cancelling pending deliveries");
            self.token.cancel();
        }
    }

    /// Wait until every delivery scheduled so far has landed or been cancelled
    pub async fn wait_idle(&self) {
        loop {
            let handles = {
                let mut guard = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *guard)
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "delivery task failed");
                }
            }
        }
    }
}

/// Counts one delivery as pending until dropped, even if the delivery panics
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(pending: Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for ReplyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_deliveries_land_in_expiry_order() {
        let scheduler = ReplyScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (label, ms) in [("slow", 2500), ("fast", 1500)] {
            let tx = tx.clone();
            scheduler.schedule("test", Duration::from_millis(ms), async move {
                let _ = tx.send(label);
            });
        }
        assert_eq!(scheduler.pending(), 2);

        scheduler.wait_idle().await;
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(rx.recv().await, Some("fast"));
        assert_eq!(rx.recv().await, Some("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_lands_before_the_delay() {
        let scheduler = ReplyScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        scheduler.schedule("test", Duration::from_secs(2), async move {
            let _ = tx.send(());
        });

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(rx.recv().await, Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_delivery_is_no_longer_pending() {
        let scheduler = ReplyScheduler::new();
        scheduler.schedule("boom", Duration::from_millis(10), async {
            panic!("delivery blew up");
        });
        assert_eq!(scheduler.pending(), 1);

        scheduler.wait_idle().await;
        assert_eq!(scheduler.pending(), 0);

        // later deliveries still work
        let (tx, mut rx) = mpsc::unbounded_channel();
        scheduler.schedule("after", Duration::from_millis(10), async move {
            let _ = tx.send(());
        });
        scheduler.wait_idle().await;
        assert_eq!(rx.recv().await, Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending_work() {
        let scheduler = ReplyScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let tx = tx.clone();
            scheduler.schedule("test", Duration::from_secs(1), async move {
                let _ = tx.send(());
            });
        }

        scheduler.cancel_all();
        scheduler.wait_idle().await;
        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.is_cancelled());

        // refused after cancellation
        scheduler.schedule("late", Duration::ZERO, async move {
            let _ = tx.send(());
        });
        scheduler.wait_idle().await;
        assert!(rx.try_recv().is_err());
    }
}
