//! Repeating schedules with deterministic cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// Work run on every tick. Each call returns a fresh future.
pub type PollTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Shortest accepted period; zero would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Source of repeating schedules.
///
/// Implementations run `task` for the first time one `period` after
/// scheduling, then once per `period`, until the returned handle is
/// cancelled or dropped. A tick never starts after cancellation.
pub trait Scheduler: Send + Sync {
    /// Run `task` once per `period` until the returned handle is cancelled.
    fn every(&self, period: Duration, task: PollTask) -> PollHandle;
}

/// Owner of one repeating schedule.
///
/// Cancelling is idempotent. Dropping the handle cancels the schedule.
#[derive(Debug)]
pub struct PollHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl PollHandle {
    /// Wrap a schedule's shared cancellation flag and, when the schedule
    /// runs on a Tokio task, that task's abort handle.
    pub fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Stop the schedule. No tick starts after this returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Whether [`cancel`](Self::cancel) has run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler that runs each schedule as a task on a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime the caller is running on.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, task: PollTask) -> PollHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let join = self.handle.spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                task().await;
            }
            debug!(period_ms = period.as_millis(), "poll schedule stopped");
        });
        PollHandle::new(cancelled, Some(join.abort_handle()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::atomic::AtomicUsize;

    use futures_util::FutureExt;
    use rstest::rstest;

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>) -> PollTask {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler::current().every(
            Duration::from_millis(1000),
            counting_task(&counter),
        );
        settle().await;

        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        for _ in 0..2 {
            tokio::time::advance(Duration::from_millis(1000)).await;
            settle().await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        drop(handle);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn cancelled_schedules_never_fire_again() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler::current().every(
            Duration::from_millis(100),
            counting_task(&counter),
        );
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let counter = Arc::new(AtomicUsize::new(0));
        drop(TokioScheduler::current().every(
            Duration::from_millis(10),
            counting_task(&counter),
        ));
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
