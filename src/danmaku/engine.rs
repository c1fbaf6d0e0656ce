// =============================================================================
// BULLET SCREEN ENGINE
// =============================================================================
//
// Owns every on-screen comment and every pending removal timer. Other parts of
// the player only reach this state through the operations below:
//
// - spawn / submit_local   create a RenderedComment and place it
// - on_pause / on_resume   freeze and continue motion in lock-step with playback
// - on_seek_or_replay      drop everything, cancelling timers first
// - fire_due_timers        expire top comments
// - purge_exited           drop moving comments that left the surface
//
// All times are wall-clock offsets, not media time.
//
// =============================================================================

use chrono::{DateTime, Local};
use std::time::Duration;

use crate::core::{Comment, CommentId, LocalSubmission, Mode, OverlayConfig};
use crate::danmaku::measure::{EstimatedMeasure, TextMeasure};
use crate::danmaku::placement;
use crate::danmaku::rendered::{Motion, Phase, RenderedComment, Transition};
use crate::danmaku::timers::RemovalTimers;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("comment text is empty")]
    EmptyText,
    #[error("bullet screen input is disabled")]
    Disabled,
}

/// Renderer-facing view of one active comment.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub id: CommentId,
    pub text: String,
    pub color: String,
    pub font_px: f64,
    pub mode: Mode,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub transition: Option<Transition>,
    pub local_preview: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySnapshot {
    pub items: Vec<OverlayItem>,
}

pub struct BulletScreen {
    config: OverlayConfig,
    measure: Box<dyn TextMeasure>,
    /// Active comments in spawn order.
    pool: Vec<RenderedComment>,
    timers: RemovalTimers,
    frozen: bool,
    switched_on: bool,
    halted: bool,
    last_local_id: i64,
}

impl BulletScreen {
    pub fn new(config: OverlayConfig) -> Self {
        Self::with_measure(config, Box::new(EstimatedMeasure::default()))
    }

    pub fn with_measure(config: OverlayConfig, measure: Box<dyn TextMeasure>) -> Self {
        let switched_on = config.bullet_screen_enabled;
        Self {
            config,
            measure,
            pool: Vec::new(),
            timers: RemovalTimers::new(),
            // motion starts only once playback does
            frozen: true,
            switched_on,
            halted: false,
            last_local_id: 0,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn active(&self) -> &[RenderedComment] {
        &self.pool
    }

    pub fn get(&self, id: &CommentId) -> Option<&RenderedComment> {
        self.pool.iter().find(|rendered| rendered.id() == id)
    }

    pub fn is_active(&self, id: &CommentId) -> bool {
        self.get(id).is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_switched_on(&self) -> bool {
        self.switched_on
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether new comments may appear at all.
    pub fn is_accepting(&self) -> bool {
        self.switched_on && !self.halted
    }

    /// Render a comment that has become due. Returns false when a comment with
    /// the same id is already on screen or the overlay is not accepting.
    pub fn spawn(&mut self, comment: Comment, now: Duration) -> bool {
        if !self.is_accepting() {
            return false;
        }
        self.render(comment, false, now)
    }

    /// Render a freshly typed comment immediately and hand it back so the
    /// caller can forward it to the comment store.
    pub fn submit_local(
        &mut self,
        submission: LocalSubmission,
        position: f64,
        authored: DateTime<Local>,
        now: Duration,
    ) -> Result<Comment, SubmitError> {
        if !self.is_accepting() {
            return Err(SubmitError::Disabled);
        }

        let text = submission.text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyText);
        }

        let id = authored.timestamp_millis().max(self.last_local_id + 1);
        self.last_local_id = id;

        let comment = Comment {
            id: CommentId::new(id.to_string()),
            text: text.to_string(),
            font_size: submission.font_size,
            color: submission.color,
            mode: submission.mode,
            scheduled_time: Comment::scheduled_time_for(position, submission.mode),
            authored_at: authored.format("%Y/%m/%d %H:%M:%S").to_string(),
        };

        self.render(comment.clone(), true, now);
        Ok(comment)
    }

    fn render(&mut self, comment: Comment, local_preview: bool, now: Duration) -> bool {
        if self.is_active(&comment.id) {
            return false;
        }

        let font_px = self.config.font_px(comment.font_size);
        let width = self.measure.text_width(&comment.text, font_px);
        let spot = placement::place(&self.pool, comment.mode, width, now, &self.config);

        let mut rendered = RenderedComment {
            motion: match comment.mode {
                Mode::Top => Motion::Stationary,
                Mode::Move => Motion::Parked { x: spot.x },
            },
            comment,
            width,
            font_px,
            slot: spot.slot,
            y: spot.y,
            origin_x: spot.x,
            phase: Phase::Entering,
            local_preview,
            removal_timer: None,
        };

        if !self.frozen {
            match rendered.mode() {
                Mode::Top => {
                    let deadline = now + self.config.top_display();
                    rendered.removal_timer = Some(self.timers.schedule(rendered.id().clone(), deadline));
                }
                Mode::Move => {
                    rendered.slide(now, &self.config);
                }
            }
        }

        log::debug!(
            "Spawned {} comment {} in {:?} at ({:.1}, {:.1})",
            rendered.mode().as_str(),
            rendered.id(),
            rendered.slot,
            rendered.origin_x,
            rendered.y
        );

        rendered.phase = Phase::Active;
        self.pool.push(rendered);
        true
    }

    /// Freeze: pin moving comments where they are and drop top comments'
    /// remaining display time.
    pub fn on_pause(&mut self, now: Duration) {
        for rendered in self.pool.iter_mut() {
            if let Some(timer) = rendered.removal_timer.take() {
                self.timers.cancel(timer);
            }
        }

        if self.frozen {
            return;
        }
        self.frozen = true;

        let mut pinned = 0;
        for rendered in self.pool.iter_mut() {
            if rendered.freeze(now).is_some() {
                pinned += 1;
            }
        }
        log::debug!("Bullet screen frozen ({} moving comments pinned)", pinned);
    }

    /// Continue: moving comments resume at the spawn speed from where they were
    /// pinned, top comments get a fresh short display timeout.
    pub fn on_resume(&mut self, now: Duration) {
        if !self.frozen {
            return;
        }
        self.frozen = false;

        let resume_after = self.config.top_resume();
        for rendered in self.pool.iter_mut() {
            match rendered.mode() {
                Mode::Move => {
                    rendered.slide(now, &self.config);
                }
                Mode::Top => {
                    if rendered.removal_timer.is_none() {
                        let timer = self.timers.schedule(rendered.id().clone(), now + resume_after);
                        rendered.removal_timer = Some(timer);
                    }
                }
            }
        }
        log::debug!("Bullet screen resumed with {} active comments", self.pool.len());
    }

    pub fn on_seek_or_replay(&mut self) -> Vec<CommentId> {
        self.clear_all()
    }

    /// Cancel every pending timer, then destroy every comment.
    pub fn clear_all(&mut self) -> Vec<CommentId> {
        let cancelled = self.timers.cancel_all();
        let removed: Vec<CommentId> = self.pool
            .drain(..)
            .map(|rendered| rendered.comment.id)
            .collect();

        if !removed.is_empty() || cancelled > 0 {
            log::debug!("Cleared {} comments and {} timers", removed.len(), cancelled);
        }
        removed
    }

    /// Switch the overlay on or off. Switching off clears the surface.
    pub fn set_switched_on(&mut self, on: bool) -> Vec<CommentId> {
        self.switched_on = on;
        if on {
            Vec::new()
        } else {
            self.clear_all()
        }
    }

    /// Stop for good after a fatal media error.
    pub fn halt(&mut self) -> Vec<CommentId> {
        self.halted = true;
        self.clear_all()
    }

    pub fn fire_due_timers(&mut self, now: Duration) -> Vec<CommentId> {
        let mut removed = Vec::new();

        for (timer, target) in self.timers.take_due(now) {
            let expired = self.pool
                .iter_mut()
                .find(|rendered| rendered.id() == &target && rendered.removal_timer == Some(timer));

            if let Some(rendered) = expired {
                rendered.removal_timer = None;
                rendered.phase = Phase::Removed;
                log::debug!("Top comment {} expired", target);
                removed.push(target);
            }
        }

        self.sweep_removed();
        removed
    }

    pub fn purge_exited(&mut self, now: Duration) -> Vec<CommentId> {
        let mut removed = Vec::new();

        for rendered in self.pool.iter_mut() {
            if rendered.phase == Phase::Active && rendered.has_exited(now) {
                rendered.phase = Phase::Removed;
                removed.push(rendered.id().clone());
            }
        }

        if !removed.is_empty() {
            self.sweep_removed();
            log::debug!("Purged {} moving comments that left the surface", removed.len());
        }
        removed
    }

    /// Drop every comment marked `Removed`.
    fn sweep_removed(&mut self) {
        self.pool.retain(|rendered| rendered.phase != Phase::Removed);
    }

    pub fn snapshot(&self, now: Duration) -> OverlaySnapshot {
        OverlaySnapshot {
            items: self.pool
                .iter()
                .map(|rendered| OverlayItem {
                    id: rendered.id().clone(),
                    text: rendered.comment.text.clone(),
                    color: rendered.comment.color.clone(),
                    font_px: rendered.font_px,
                    mode: rendered.mode(),
                    x: rendered.x_at(now),
                    y: rendered.y,
                    width: rendered.width,
                    transition: rendered.transition(),
                    local_preview: rendered.local_preview,
                })
                .collect(),
        }
    }
}
