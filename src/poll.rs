//! Repeating background fetches.
//!
//! Views that show live data re-run their primary fetch on a fixed
//! interval. The task is tied to the [`Poller`] handle: dropping the
//! handle aborts the task, so teardown happens even when the owner
//! unwinds. A manual refresh may run concurrently with a pending tick;
//! both write to the cache and the later write wins, which is fine for
//! read-mostly display data.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Runs `task` immediately and then once per `interval` until the
    /// poller is stopped or dropped.
    pub fn spawn<F, Fut>(interval: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                task().await;
            }
        });
        debug!(interval_secs = interval.as_secs_f64(), "poller started");
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn ticks_repeatedly_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let poller = Poller::spawn(Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.stop();
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected multiple ticks, got {}", after_stop);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn drop_aborts_the_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        {
            let _poller = Poller::spawn(Duration::from_millis(10), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        let frozen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }
}
