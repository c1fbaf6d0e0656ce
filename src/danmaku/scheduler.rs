use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::core::{Comment, CommentId};
use crate::danmaku::engine::BulletScreen;

/// What one scheduler tick changed on the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: Vec<CommentId>,
    pub purged: Vec<CommentId>,
}

/// Matches the cached comment set against the playback position at a fixed
/// cadence. Matching is by whole second; comments sharing a second spawn in
/// ascending id order. An id spawns at most once until the playback position
/// is rewound.
pub struct Scheduler {
    interval: Duration,
    next_tick: Option<Duration>,
    by_second: BTreeMap<u64, Vec<Comment>>,
    loaded: usize,
    spawned: HashSet<CommentId>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
            by_second: BTreeMap::new(),
            loaded: 0,
            spawned: HashSet::new(),
        }
    }

    /// Replace the cached comment set with a fresh result from the store.
    pub fn load(&mut self, comments: Vec<Comment>) {
        let mut by_second: BTreeMap<u64, Vec<Comment>> = BTreeMap::new();
        for comment in comments {
            by_second.entry(comment.scheduled_time).or_default().push(comment);
        }

        let mut loaded = 0;
        for bucket in by_second.values_mut() {
            bucket.sort_by(|a, b| a.id.cmp(&b.id));
            bucket.dedup_by(|a, b| a.id == b.id);
            loaded += bucket.len();
        }

        self.by_second = by_second;
        self.loaded = loaded;
        log::info!("Loaded {} comments into the scheduler", loaded);
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn due_at(&self, second: u64) -> &[Comment] {
        self.by_second.get(&second).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record an id shown outside of a tick, such as a local submission.
    pub fn mark_spawned(&mut self, id: CommentId) {
        self.spawned.insert(id);
    }

    pub fn has_spawned(&self, id: &CommentId) -> bool {
        self.spawned.contains(id)
    }

    /// Forget what has been shown, after a seek, a replay or a cleared overlay.
    pub fn rewind(&mut self) {
        self.spawned.clear();
    }

    pub fn start(&mut self, now: Duration) {
        self.next_tick = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_tick(&self) -> Option<Duration> {
        self.next_tick
    }

    /// Run one tick at wall-clock `at`. Spawning happens before purging, so a
    /// comment that is due and already out of view is still shown once.
    pub fn tick(&mut self, at: Duration, position: f64, playing: bool, bullets: &mut BulletScreen) -> TickReport {
        if self.next_tick.is_some() {
            self.next_tick = Some(at + self.interval);
        }

        let mut report = TickReport::default();

        if playing && bullets.is_accepting() {
            let second = if position.is_finite() && position > 0.0 {
                position.floor() as u64
            } else {
                0
            };

            let due = self.by_second.get(&second).map(Vec::as_slice).unwrap_or(&[]);
            for comment in due {
                if self.spawned.contains(&comment.id) || bullets.is_active(&comment.id) {
                    continue;
                }
                if bullets.spawn(comment.clone(), at) {
                    self.spawned.insert(comment.id.clone());
                    report.spawned.push(comment.id.clone());
                }
            }
        }

        report.purged = bullets.purge_exited(at);
        report
    }
}
