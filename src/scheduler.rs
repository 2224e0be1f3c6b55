//! Cancellable delayed tasks scoped to a play-through.
//!
//! Controllers never sleep. They schedule an event with a delay and feed
//! elapsed time in from the event loop. Every task carries the id of the
//! play-through that scheduled it, and a task whose play-through is no longer
//! current is discarded instead of fired.

use std::time::Duration;

use derive_more::Display;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// Identity of one play-through of one game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{}", _0)]
pub struct PlaythroughId(Uuid);

impl PlaythroughId {
    /// Creates a fresh, unique id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<E> {
    id: TaskId,
    playthrough: PlaythroughId,
    remaining: Duration,
    event: E,
}

/// Queue of delayed events driven by elapsed time.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    tasks: Vec<ScheduledTask<E>>,
    next_id: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: std::fmt::Debug> Scheduler<E> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` to fire after `delay` for `playthrough`.
    #[instrument(skip(self))]
    pub fn schedule(&mut self, playthrough: PlaythroughId, delay: Duration, event: E) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        trace!(task = ?id, "Task scheduled");
        self.tasks.push(ScheduledTask {
            id,
            playthrough,
            remaining: delay,
            event,
        });
        id
    }

    /// Cancels one task. Returns whether it was still pending.
    #[instrument(skip(self))]
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Cancels every task belonging to `playthrough`. Returns how many.
    #[instrument(skip(self))]
    pub fn cancel_playthrough(&mut self, playthrough: PlaythroughId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.playthrough != playthrough);
        let cancelled = before - self.tasks.len();
        if cancelled > 0 {
            debug!(cancelled, "Cancelled play-through tasks");
        }
        cancelled
    }

    /// Number of pending tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Time until the earliest pending task fires.
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|task| task.remaining).min()
    }

    /// Advances time by at most `budget`, stopping at the first due task.
    ///
    /// Returns the events that fired, in due order, and subtracts the time
    /// consumed from `budget`. Tasks of any play-through other than `current`
    /// are dropped unfired.
    #[instrument(skip(self))]
    pub fn step(&mut self, budget: &mut Duration, current: PlaythroughId) -> Vec<E> {
        self.drop_stale(current);

        let step = match self.next_due() {
            Some(due) if due <= *budget => due,
            _ => *budget,
        };
        *budget -= step;

        let mut fired = Vec::new();
        let mut kept = Vec::with_capacity(self.tasks.len());
        for mut task in self.tasks.drain(..) {
            if task.remaining <= step {
                fired.push(task);
            } else {
                task.remaining -= step;
                kept.push(task);
            }
        }
        self.tasks = kept;

        fired.sort_by_key(|task| (task.remaining, task.id));
        fired.into_iter().map(|task| task.event).collect()
    }

    /// Advances time by all of `elapsed` and returns every event that fired.
    ///
    /// Use [`Scheduler::step`] instead when handling an event may schedule
    /// follow-up tasks that should also count against `elapsed`.
    #[instrument(skip(self))]
    pub fn advance(&mut self, elapsed: Duration, current: PlaythroughId) -> Vec<E> {
        let mut budget = elapsed;
        let mut fired = Vec::new();
        loop {
            let events = self.step(&mut budget, current);
            let progressed = !events.is_empty();
            fired.extend(events);
            if budget.is_zero() || !progressed {
                break;
            }
        }
        fired
    }

    fn drop_stale(&mut self, current: PlaythroughId) {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.playthrough == current);
        let dropped = before - self.tasks.len();
        if dropped > 0 {
            debug!(dropped, "Dropped tasks from a replaced play-through");
        }
    }
}
