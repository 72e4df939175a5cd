//! Fire-once delayed side effects.
//!
//! A task owns everything it needs when it fires; it never looks at the
//! console state that existed when it was scheduled.

use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum DeferredAction {
    OpenExternal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: u64,
    pub due: Instant,
    pub action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, action: DeferredAction) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.push(ScheduledTask {
            id,
            due: now + delay,
            action,
        });
        id
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|task| task.due).min()
    }

    /// Removes and returns tasks due at or before `now`, oldest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;
        due.sort_by_key(|task| (task.due, task.id));
        due
    }

    /// Removes every task regardless of deadline, in firing order.
    pub fn take_all(&mut self) -> Vec<ScheduledTask> {
        let mut all = std::mem::take(&mut self.tasks);
        all.sort_by_key(|task| (task.due, task.id));
        all
    }
}
