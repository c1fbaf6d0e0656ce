use std::time::Duration;

use crate::core::{Comment, CommentId, Mode, OverlayConfig};
use crate::danmaku::timers::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Active,
    Removed,
}

/// Vertical slot assigned by the placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Row index for top comments.
    Lane(usize),
    /// Row index for moving comments.
    Band(usize),
}

impl Slot {
    pub fn row(self) -> usize {
        match self {
            Slot::Lane(row) | Slot::Band(row) => row,
        }
    }
}

/// Horizontal motion of a comment, in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Top comments never move.
    Stationary,
    /// A moving comment held at `x`, either not yet launched or frozen.
    Parked { x: f64 },
    /// Linear travel of `distance` pixels to the left, starting at `from_x`.
    Sliding {
        from_x: f64,
        distance: f64,
        started_at: Duration,
        duration: Duration,
    },
}

/// Transform a renderer should apply, relative to the spawn position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub translate_x: f64,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RenderedComment {
    pub comment: Comment,
    pub width: f64,
    pub font_px: f64,
    pub slot: Slot,
    pub y: f64,
    /// Left edge at spawn.
    pub origin_x: f64,
    pub motion: Motion,
    pub phase: Phase,
    /// Authored in this session and not yet echoed back by the store.
    pub local_preview: bool,
    pub removal_timer: Option<TimerId>,
}

impl RenderedComment {
    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn mode(&self) -> Mode {
        self.comment.mode
    }

    /// Left edge at wall-clock `now`.
    pub fn x_at(&self, now: Duration) -> f64 {
        match self.motion {
            Motion::Stationary => self.origin_x,
            Motion::Parked { x } => x,
            Motion::Sliding { from_x, distance, started_at, duration } => {
                let elapsed = now.saturating_sub(started_at);
                let progress = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
                };
                from_x - distance * progress
            }
        }
    }

    /// Right edge at `now`.
    pub fn trailing_edge(&self, now: Duration) -> f64 {
        self.x_at(now) + self.width
    }

    /// A moving comment is gone once its right edge has crossed the left side.
    pub fn has_exited(&self, now: Duration) -> bool {
        self.mode() == Mode::Move && self.trailing_edge(now) <= 0.0
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.motion, Motion::Sliding { .. })
    }

    /// Start (or continue) travelling from the current position to just past
    /// the left edge at the configured constant speed. Returns the travel time.
    pub fn slide(&mut self, now: Duration, config: &OverlayConfig) -> Option<Duration> {
        let x = match self.motion {
            Motion::Parked { x } => x,
            _ => return None,
        };
        let distance = (x + self.width + config.spacing).max(0.0);
        let duration = config.travel_duration(distance);
        self.motion = Motion::Sliding {
            from_x: x,
            distance,
            started_at: now,
            duration,
        };
        Some(duration)
    }

    /// Pin the comment where it currently is. Returns the frozen position.
    pub fn freeze(&mut self, now: Duration) -> Option<f64> {
        if !self.is_sliding() {
            return None;
        }
        let x = self.x_at(now);
        self.motion = Motion::Parked { x };
        Some(x)
    }

    pub fn transition(&self) -> Option<Transition> {
        match self.motion {
            Motion::Stationary => None,
            Motion::Parked { x } => Some(Transition {
                translate_x: x - self.origin_x,
                duration: Duration::ZERO,
            }),
            Motion::Sliding { from_x, distance, duration, .. } => Some(Transition {
                translate_x: from_x - distance - self.origin_x,
                duration,
            }),
        }
    }
}
