//! Scheduler driven by explicit calls instead of wall-clock time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::inbound::sync::{PollHandle, PollTask, Scheduler};

const MIN_PERIOD: Duration = Duration::from_millis(1);

struct Schedule {
    period: Duration,
    due: Duration,
    task: PollTask,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    schedules: Vec<Schedule>,
}

/// Logical-time scheduler for tests.
///
/// Time starts at zero and moves only through [`ManualScheduler::advance`],
/// which runs every due tick in order and awaits each one to completion.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// use chat_backend::inbound::sync::{PollTask, Scheduler};
/// use chat_backend::test_support::ManualScheduler;
/// use futures_util::FutureExt;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let scheduler = ManualScheduler::new();
/// let ticks = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&ticks);
/// let task: PollTask = Arc::new(move || {
///     let counter = Arc::clone(&counter);
///     async move {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }
///     .boxed()
/// });
/// let handle = scheduler.every(Duration::from_millis(1000), task);
///
/// scheduler.advance(Duration::from_millis(2500)).await;
/// assert_eq!(ticks.load(Ordering::SeqCst), 2);
/// drop(handle);
/// # });
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    timeline: Mutex<Timeline>,
}

impl ManualScheduler {
    /// A scheduler at logical time zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    fn timeline(&self) -> MutexGuard<'_, Timeline> {
        match self.timeline.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("scheduler mutex"),
        }
    }

    /// Logical time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.timeline().now
    }

    /// Number of schedules that have not been cancelled.
    pub fn active_schedules(&self) -> usize {
        let mut timeline = self.timeline();
        timeline
            .schedules
            .retain(|schedule| !schedule.cancelled.load(Ordering::Acquire));
        timeline.schedules.len()
    }

    /// Move logical time forward by `by`, running every tick that falls due.
    ///
    /// Ticks run one at a time in due order; schedules cancelled by an
    /// earlier tick do not run.
    pub async fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let task = {
                let mut timeline = self.timeline();
                timeline
                    .schedules
                    .retain(|schedule| !schedule.cancelled.load(Ordering::Acquire));
                let Some(schedule) = timeline
                    .schedules
                    .iter_mut()
                    .filter(|schedule| schedule.due <= target)
                    .min_by_key(|schedule| schedule.due)
                else {
                    break;
                };
                let due = schedule.due;
                schedule.due += schedule.period;
                let task = Arc::clone(&schedule.task);
                timeline.now = due;
                task
            };
            task().await;
        }
        self.timeline().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, task: PollTask) -> PollHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut timeline = self.timeline();
        let due = timeline.now + period;
        timeline.schedules.push(Schedule {
            period,
            due,
            task,
            cancelled: Arc::clone(&cancelled),
        });
        PollHandle::new(cancelled, None)
    }
}
