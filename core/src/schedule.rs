use alloc::collections::BTreeMap;

use crate::Timestamp;

/// Handle for cancelling a scheduled task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskToken(u64);

/// Deferred work ordered by deadline, then by scheduling order.
///
/// Nothing here reads a clock: the owner passes `now` in and decides when
/// to drain, which keeps delayed behavior testable without real timers.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    queue: BTreeMap<(Timestamp, TaskToken), T>,
    deadlines: BTreeMap<TaskToken, Timestamp>,
    next_token: u64,
}

impl<T> Scheduler<T> {
    pub const fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: BTreeMap::new(),
            next_token: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, deadline: Timestamp, task: T) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.queue.insert((deadline, token), task);
        self.deadlines.insert(token, deadline);
        token
    }

    pub fn is_scheduled(&self, token: TaskToken) -> bool {
        self.deadlines.contains_key(&token)
    }

    /// Returns the task if it had not run yet.
    pub fn cancel(&mut self, token: TaskToken) -> Option<T> {
        let deadline = self.deadlines.remove(&token)?;
        self.queue.remove(&(deadline, token))
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Removes and returns the earliest task whose deadline is not after
    /// `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(TaskToken, T)> {
        let entry = self.queue.first_entry()?;
        let &(deadline, token) = entry.key();
        if deadline > now {
            return None;
        }
        let task = entry.remove();
        self.deadlines.remove(&token);
        Some((token, task))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use chrono::{DateTime, TimeDelta};

    fn at(millis: i64) -> Timestamp {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn drain(scheduler: &mut Scheduler<&'static str>, now: Timestamp) -> Vec<&'static str> {
        core::iter::from_fn(|| scheduler.pop_due(now).map(|(_, task)| task)).collect()
    }

    #[test]
    fn runs_due_tasks_in_deadline_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(at(800), "revert");
        scheduler.schedule(at(700), "check");
        scheduler.schedule(at(700), "second check");

        assert_eq!(scheduler.next_deadline(), Some(at(700)));
        assert!(drain(&mut scheduler, at(699)).is_empty());
        assert_eq!(drain(&mut scheduler, at(700)), ["check", "second check"]);
        assert_eq!(drain(&mut scheduler, at(700) + TimeDelta::seconds(1)), ["revert"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(at(10), "keep");
        let drop = scheduler.schedule(at(5), "drop");

        assert_eq!(scheduler.cancel(drop), Some("drop"));
        assert_eq!(scheduler.cancel(drop), None);
        assert!(!scheduler.is_scheduled(drop));
        assert!(scheduler.is_scheduled(keep));
        assert_eq!(scheduler.next_deadline(), Some(at(10)));
        assert_eq!(drain(&mut scheduler, at(100)), ["keep"]);
        assert_eq!(scheduler.cancel(keep), None);
    }
}
