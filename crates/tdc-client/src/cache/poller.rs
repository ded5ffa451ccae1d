use super::optimistic::{Entity, OptimisticList};
use crate::error::ClientError;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Background refetch of an [`OptimisticList`].
pub struct Poller;

impl Poller {
    /// Refetch `list` every `interval`, and whenever
    /// [`PollHandle::refetch_now`] is called.
    ///
    /// Each fetch is stamped when issued, so responses never overwrite
    /// entities edited locally after the request went out. Failed fetches
    /// are logged and leave the list untouched.
    pub fn spawn<T, F>(list: Arc<OptimisticList<T>>, interval: Duration, fetch: F) -> PollHandle
    where
        T: Entity + Sync,
        F: Fn() -> BoxFuture<'static, Result<Vec<T>, ClientError>> + Send + 'static,
    {
        let wake = Arc::new(Notify::new());
        let alive = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn({
            let wake = wake.clone();
            let alive = alive.clone();
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                while alive.load(Ordering::SeqCst) {
                    tokio::select! {
                        _ = ticker.tick() => {},
                        _ = wake.notified() => {},
                    }
                    let stamp = list.begin_fetch();
                    match fetch().await {
                        Ok(items) => list.apply_fetch(stamp, items),
                        Err(e) => tracing::warn!("Background refetch failed: {}", e),
                    }
                }
            }
        });

        PollHandle { wake, alive, task }
    }
}

/// Stops the poller when dropped.
pub struct PollHandle {
    wake: Arc<Notify>,
    alive: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Refetch immediately, e.g. after a mutation.
    pub fn refetch_now(&self) {
        self.wake.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    pub fn stop(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}
