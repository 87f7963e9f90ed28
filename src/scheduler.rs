//! The deferral primitive a chain uses to kick itself off and to pause.
//!
//! A [`Scheduler`] runs a task once, later, after the current synchronous
//! execution has unwound. Chains only ever ask for two things: "as soon as
//! possible" ([`Scheduler::defer`]) and "after this long"
//! ([`Scheduler::defer_for`]).
//!
//! Two implementations ship with the crate:
//!
//! - [`LocalScheduler`]: hands tasks to the tokio `LocalSet` the caller is
//!   running in. This is the default.
//! - [`ManualScheduler`]: queues tasks until the host drives it with
//!   [`ManualScheduler::run_until_idle`], using a virtual clock for timed tasks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// One-shot "run later" capability.
pub trait Scheduler {
    /// Run `task` once, after the current synchronous execution completes.
    fn defer(&self, task: Task);

    /// Run `task` once, no sooner than `delay` from now.
    fn defer_for(&self, delay: Duration, task: Task);
}

/// Defers onto the current tokio [`LocalSet`](tokio::task::LocalSet).
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so every chain using
/// this scheduler must be created from inside a `LocalSet` (for example under
/// `LocalSet::run_until`). Outside one, `spawn_local` panics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

impl Scheduler for LocalScheduler {
    fn defer(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }

    fn defer_for(&self, delay: Duration, task: Task) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task()
        });
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    ready: VecDeque<Task>,
    timers: Vec<Timer>,
    now: Duration,
    seq: u64,
}

impl Queue {
    fn pop_timer(&mut self) -> Option<Task> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        let timer = self.timers.swap_remove(index);
        self.now = self.now.max(timer.due);
        Some(timer.task)
    }
}

/// A deterministic scheduler driven by the host.
///
/// Deferred tasks run in FIFO order. Timed tasks run once no ready task is
/// left, earliest deadline first, advancing a virtual clock instead of
/// sleeping.
///
/// ```
/// use std::rc::Rc;
/// use jam::{ManualScheduler, Scheduler};
///
/// let scheduler = Rc::new(ManualScheduler::new());
/// let log = Rc::new(std::cell::RefCell::new(Vec::new()));
///
/// let l = log.clone();
/// scheduler.defer_for(std::time::Duration::from_millis(5), Box::new(move || l.borrow_mut().push("late")));
/// let l = log.clone();
/// scheduler.defer(Box::new(move || l.borrow_mut().push("soon")));
///
/// assert_eq!(2, scheduler.run_until_idle());
/// assert_eq!(vec!["soon", "late"], *log.borrow());
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Queue>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting, timed ones included.
    pub fn pending(&self) -> usize {
        let queue = self.queue.borrow();
        queue.ready.len() + queue.timers.len()
    }

    /// Virtual time consumed by timed tasks so far.
    pub fn elapsed(&self) -> Duration {
        self.queue.borrow().now
    }

    /// Run ready tasks only, leaving timed tasks and the clock alone.
    ///
    /// Returns the number of tasks run.
    pub fn run_ready(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.borrow_mut().ready.pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Run everything, including tasks scheduled by running tasks, until
    /// nothing is left.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            ran += self.run_ready();
            let timer = self.queue.borrow_mut().pop_timer();
            match timer {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, task: Task) {
        self.queue.borrow_mut().ready.push_back(task);
    }

    fn defer_for(&self, delay: Duration, task: Task) {
        let mut queue = self.queue.borrow_mut();
        let due = queue.now.saturating_add(delay);
        let seq = queue.seq;
        queue.seq += 1;
        queue.timers.push(Timer { due, seq, task });
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("ManualScheduler")
            .field("ready", &queue.ready.len())
            .field("timers", &queue.timers.len())
            .field("now", &queue.now)
            .finish()
    }
}
