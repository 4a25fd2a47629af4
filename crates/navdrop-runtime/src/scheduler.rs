//! Deferred work: next-frame callbacks and one-shot timers.
//!
//! [`Scheduler`] is the seam between dropdown components and the host's
//! event loop. Components never block; they ask for a callback on the next
//! animation frame (post-layout measurement) or after a delay (debounce
//! timers), and keep the returned [`TaskHandle`].
//!
//! # Cancellation
//!
//! A [`TaskHandle`] cancels its task when dropped. Owning the handle is
//! owning the pending callback: replacing or dropping it releases the work,
//! so a component that is torn down cannot be called back later.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use navdrop_runtime::scheduler::{ManualScheduler, Scheduler};
//! use navdrop_core::Duration;
//!
//! let scheduler = ManualScheduler::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//! let handle = scheduler.set_timeout(Duration::from_millis(15), Box::new(move || flag.set(true)));
//!
//! scheduler.advance(Duration::from_millis(14));
//! assert!(!fired.get());
//! scheduler.advance(Duration::from_millis(1));
//! assert!(fired.get());
//! assert!(!handle.is_pending());
//! ```

#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;
use web_time::Duration;

/// A deferred callback.
pub type Task = Box<dyn FnOnce()>;

/// Lifecycle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting to run.
    Pending,
    /// Ran (or is running).
    Fired,
    /// Cancelled before it ran; it never will.
    Cancelled,
}

/// Owner side of a scheduled task. Dropping it cancels the task.
#[must_use = "dropping a TaskHandle cancels the scheduled task"]
pub struct TaskHandle {
    state: Rc<Cell<TaskState>>,
}

/// Scheduler side of a scheduled task.
///
/// Scheduler implementations call [`TaskSlot::claim`] right before running
/// the task and skip it when the claim fails.
pub struct TaskSlot {
    state: Rc<Cell<TaskState>>,
}

/// Create a linked handle/slot pair for a new pending task.
pub fn task_pair() -> (TaskHandle, TaskSlot) {
    let state = Rc::new(Cell::new(TaskState::Pending));
    (
        TaskHandle {
            state: Rc::clone(&state),
        },
        TaskSlot { state },
    )
}

impl TaskHandle {
    /// Cancel the task. Returns `true` if it was still pending.
    pub fn cancel(&self) -> bool {
        if self.state.get() == TaskState::Pending {
            self.state.set(TaskState::Cancelled);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.state.get() == TaskState::Pending
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state.get()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("state", &self.state.get())
            .finish()
    }
}

impl TaskSlot {
    /// Mark the task as fired. Returns `false` if it was cancelled.
    pub fn claim(&self) -> bool {
        if self.state.get() == TaskState::Pending {
            self.state.set(TaskState::Fired);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.state.get() == TaskState::Pending
    }
}

/// Host event-loop seam: animation frames and timers.
///
/// Implementations must run tasks on the same thread that scheduled them and
/// never synchronously from inside `request_frame` / `set_timeout`.
pub trait Scheduler {
    /// Run `task` at the next animation-frame boundary.
    fn request_frame(&self, task: Task) -> TaskHandle;

    /// Run `task` once, `delay` from now.
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskHandle;
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

struct Timer {
    deadline: Duration,
    seq: u64,
    slot: TaskSlot,
    task: Task,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_seq: u64,
    frames: Vec<(TaskSlot, Task)>,
    timers: Vec<Timer>,
}

/// Deterministic scheduler driven explicitly by its owner.
///
/// Time is virtual: it only moves on [`advance`](Self::advance) /
/// [`tick`](Self::tick). Headless hosts drive it from their own loop; tests
/// drive it step by step.
///
/// # Invariants
///
/// 1. `run_frame()` runs exactly the frame tasks queued before the call;
///    tasks queued while it runs wait for the next frame.
/// 2. Timers fire in deadline order, ties broken by scheduling order.
/// 3. A timer scheduled by a callback during `advance` fires in the same
///    `advance` if its deadline falls inside the window.
/// 4. Cancelled tasks never run.
#[derive(Default)]
pub struct ManualScheduler {
    inner: RefCell<ManualInner>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Run one animation frame. Returns the number of tasks that ran.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut self.inner.borrow_mut().frames);
        let mut ran = 0;
        for (slot, task) in batch {
            if slot.claim() {
                task();
                ran += 1;
            }
        }
        if ran > 0 {
            trace!(ran, "frame tasks ran");
        }
        ran
    }

    /// Move virtual time forward by `elapsed`, firing due timers.
    /// Returns the number of timers that ran.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let target = self.now() + elapsed;
        let mut ran = 0;
        while let Some(timer) = self.pop_due(target) {
            self.inner.borrow_mut().now = timer.deadline;
            if timer.slot.claim() {
                (timer.task)();
                ran += 1;
            }
        }
        self.inner.borrow_mut().now = target;
        if ran > 0 {
            trace!(ran, now_ms = target.as_millis() as u64, "timers fired");
        }
        ran
    }

    /// One host loop iteration: advance time, then run a frame.
    pub fn tick(&self, elapsed: Duration) -> usize {
        self.advance(elapsed) + self.run_frame()
    }

    /// Frame tasks still waiting to run.
    pub fn pending_frames(&self) -> usize {
        self.inner
            .borrow()
            .frames
            .iter()
            .filter(|(slot, _)| slot.is_pending())
            .count()
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.inner
            .borrow()
            .timers
            .iter()
            .filter(|t| t.slot.is_pending())
            .count()
    }

    fn pop_due(&self, target: Duration) -> Option<Timer> {
        let mut inner = self.inner.borrow_mut();
        inner.timers.retain(|t| t.slot.is_pending());
        let index = inner
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= target)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(i, _)| i)?;
        Some(inner.timers.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&self, task: Task) -> TaskHandle {
        let (handle, slot) = task_pair();
        self.inner.borrow_mut().frames.push((slot, task));
        handle
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> TaskHandle {
        let (handle, slot) = task_pair();
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.push(Timer {
            deadline,
            seq,
            slot,
            task,
        });
        handle
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending_frames", &self.pending_frames())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let make = move |name: &'static str| -> Task {
            let log = Rc::clone(&log_clone);
            Box::new(move || log.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn frame_tasks_wait_for_run_frame() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let _h = scheduler.request_frame(task("a"));
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending_frames(), 1);
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn frame_task_queued_during_frame_runs_next_frame() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (log, task) = recorder();
        let nested: Rc<RefCell<Option<TaskHandle>>> = Rc::new(RefCell::new(None));
        let sched = Rc::clone(&scheduler);
        let nested_clone = Rc::clone(&nested);
        let second = task("second");
        let _h = scheduler.request_frame(Box::new(move || {
            *nested_clone.borrow_mut() = Some(sched.request_frame(second));
        }));

        assert_eq!(scheduler.run_frame(), 1);
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn dropped_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        drop(scheduler.request_frame(task("frame")));
        drop(scheduler.set_timeout(Duration::from_millis(1), task("timer")));
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
        scheduler.run_frame();
        scheduler.advance(Duration::from_millis(5));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn cancel_reports_whether_pending() {
        let scheduler = ManualScheduler::new();
        let (_log, task) = recorder();
        let handle = scheduler.set_timeout(Duration::from_millis(1), task("t"));
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(handle.state(), TaskState::Cancelled);
    }

    #[test]
    fn timers_fire_in_deadline_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let _a = scheduler.set_timeout(Duration::from_millis(20), task("late"));
        let _b = scheduler.set_timeout(Duration::from_millis(10), task("early-1"));
        let _c = scheduler.set_timeout(Duration::from_millis(10), task("early-2"));
        assert_eq!(scheduler.advance(Duration::from_millis(25)), 3);
        assert_eq!(*log.borrow(), vec!["early-1", "early-2", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(25));
    }

    #[test]
    fn timer_scheduled_inside_window_fires_same_advance() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (log, task) = recorder();
        let chained: Rc<RefCell<Option<TaskHandle>>> = Rc::new(RefCell::new(None));
        let sched = Rc::clone(&scheduler);
        let chained_clone = Rc::clone(&chained);
        let follow = task("follow");
        let _h = scheduler.set_timeout(
            Duration::from_millis(5),
            Box::new(move || {
                *chained_clone.borrow_mut() =
                    Some(sched.set_timeout(Duration::from_millis(5), follow));
            }),
        );
        assert_eq!(scheduler.advance(Duration::from_millis(10)), 2);
        assert_eq!(*log.borrow(), vec!["follow"]);
    }

    #[test]
    fn timer_not_due_stays_pending() {
        let scheduler = ManualScheduler::new();
        let (_log, task) = recorder();
        let handle = scheduler.set_timeout(Duration::from_millis(15), task("t"));
        scheduler.advance(Duration::from_millis(14));
        assert!(handle.is_pending());
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(handle.state(), TaskState::Fired);
    }

    #[test]
    fn tick_runs_timers_then_frame() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let _f = scheduler.request_frame(task("frame"));
        let _t = scheduler.set_timeout(Duration::from_millis(16), task("timer"));
        assert_eq!(scheduler.tick(Duration::from_millis(16)), 2);
        assert_eq!(*log.borrow(), vec!["timer", "frame"]);
    }
}
