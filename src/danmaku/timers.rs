use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::CommentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingRemoval {
    deadline: Duration,
    target: CommentId,
}

/// Pending removal timers for top comments, keyed by wall-clock deadline.
#[derive(Debug, Default)]
pub struct RemovalTimers {
    next_id: u64,
    pending: BTreeMap<TimerId, PendingRemoval>,
}

impl RemovalTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, target: CommentId, deadline: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert(id, PendingRemoval { deadline, target });
        id
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest deadline first.
    pub fn take_due(&mut self, now: Duration) -> Vec<(TimerId, CommentId)> {
        let due_ids: Vec<TimerId> = self.pending
            .iter()
            .filter(|(_, removal)| removal.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut due: Vec<(TimerId, PendingRemoval)> = due_ids
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|removal| (id, removal)))
            .collect();
        due.sort_by_key(|(id, removal)| (removal.deadline, *id));

        due.into_iter().map(|(id, removal)| (id, removal.target)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
