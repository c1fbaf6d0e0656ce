// =============================================================================
// PLAYER - WIRES THE MEDIA CLOCK, COMMENT STORE AND BULLET SCREEN TOGETHER
// =============================================================================
//
// One Player per playback session. It owns every piece of mutable state and
// drives it from a single thread: callers feed it control input, status
// reports and the current wall-clock time, and it reports what changed over a
// broadcast channel.
//
// =============================================================================

use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::core::{Comment, CommentId, LocalSubmission, OverlayConfig};
use crate::danmaku::{BulletScreen, OverlaySnapshot, Scheduler, SubmitError};
use crate::playback::{
    ControlError, ControlSigns, MediaClock, MediaError, PlaybackContext, PlaybackState, PlaybackStateMachine,
    ReadyState,
};
use crate::store::{CommentStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    StateChanged { from: PlaybackState, to: PlaybackState },
    /// A fatal media error, sent at most once per session.
    ErrorSurfaced(&'static str),
    CommentSpawned(CommentId),
    /// Expired or scrolled out. Bulk clears on seek, replay or error are not
    /// reported one by one.
    CommentRemoved(CommentId),
    CommentsLoaded(usize),
    SubmitFailed(String),
}

pub struct Player<C: MediaClock, S: CommentStore> {
    config: OverlayConfig,
    clock: C,
    store: S,
    bullets: BulletScreen,
    scheduler: Scheduler,
    machine: PlaybackStateMachine,
    surfaced_error: Option<&'static str>,
    event_sender: broadcast::Sender<PlayerEvent>,
}

impl<C: MediaClock, S: CommentStore> Player<C, S> {
    pub fn new(config: OverlayConfig, clock: C, store: S) -> Self {
        let (event_sender, _) = broadcast::channel(256);
        Self {
            bullets: BulletScreen::new(config.clone()),
            scheduler: Scheduler::new(config.poll_interval()),
            machine: PlaybackStateMachine::new(),
            surfaced_error: None,
            config,
            clock,
            store,
            event_sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_sender.subscribe()
    }

    fn emit(&self, event: PlayerEvent) {
        // nobody listening is fine
        let _ = self.event_sender.send(event);
    }

    fn emit_removed(&self, removed: Vec<CommentId>) {
        for id in removed {
            self.emit(PlayerEvent::CommentRemoved(id));
        }
    }

    /// Start polling and load the comment set.
    pub fn start(&mut self, now: Duration) {
        log::info!("Starting player (poll interval {:?})", self.config.poll_interval());
        self.scheduler.start(now);

        if self.config.autoplay {
            if let Err(e) = self.clock.play() {
                log::warn!("Autoplay failed: {}", e);
            }
        }

        if self.bullets.is_switched_on() {
            if let Err(e) = self.refresh_comments() {
                log::warn!("Failed to load comments: {}", e);
            }
        }
    }

    /// Fetch the full comment set from the store and hand it to the scheduler.
    pub fn refresh_comments(&mut self) -> Result<usize, StoreError> {
        let response = self.store.fetch()?;
        if !response.accepted {
            return Err(StoreError::Rejected);
        }
        let count = response.all_comments.len();
        self.scheduler.load(response.all_comments);
        self.emit(PlayerEvent::CommentsLoaded(count));
        Ok(count)
    }

    fn drive<R>(&mut self, now: Duration, f: impl FnOnce(&mut PlaybackStateMachine, &mut PlaybackContext<'_>) -> R) -> R {
        let result = {
            let mut ctx = PlaybackContext {
                clock: &mut self.clock,
                bullets: &mut self.bullets,
                scheduler: &mut self.scheduler,
                now,
            };
            f(&mut self.machine, &mut ctx)
        };

        for change in self.machine.take_changes() {
            self.emit(PlayerEvent::StateChanged {
                from: change.from,
                to: change.to,
            });
        }
        result
    }

    fn surface(&mut self, message: Option<&'static str>) {
        if let Some(message) = message {
            if self.surfaced_error.is_none() {
                self.surfaced_error = Some(message);
                self.emit(PlayerEvent::ErrorSurfaced(message));
            }
        }
    }

    /// Run every scheduler tick due up to `now`, then expire top comments.
    pub fn advance(&mut self, now: Duration) {
        while let Some(at) = self.scheduler.next_tick().filter(|at| *at <= now) {
            let expired = self.bullets.fire_due_timers(at);
            self.emit_removed(expired);

            self.poll(at);
            if !self.scheduler.is_running() {
                break;
            }

            let position = self.clock.current_position();
            let playing = self.machine.state().is_playing();
            let report = self.scheduler.tick(at, position, playing, &mut self.bullets);

            for id in report.spawned {
                self.emit(PlayerEvent::CommentSpawned(id));
            }
            self.emit_removed(report.purged);
        }

        let expired = self.bullets.fire_due_timers(now);
        self.emit_removed(expired);
    }

    /// Read the clock's status and react to it.
    pub fn poll(&mut self, now: Duration) {
        let message = self.drive(now, |machine, ctx| machine.poll(ctx));
        self.surface(message);
    }

    pub fn toggle(&mut self, now: Duration) {
        self.drive(now, |machine, ctx| machine.toggle(ctx));
    }

    pub fn seek(&mut self, seconds: f64, now: Duration) -> Result<(), ControlError> {
        self.drive(now, |machine, ctx| machine.seek(seconds, ctx))
    }

    pub fn report_buffer_level(&mut self, code: u8, now: Duration) {
        let level = ReadyState::from_code(code);
        self.drive(now, |machine, ctx| machine.report_buffer_level(level, ctx));
    }

    pub fn report_error(&mut self, code: u16, now: Duration) {
        match MediaError::from_code(code) {
            Some(error) => {
                let message = self.drive(now, |machine, ctx| machine.report_error(error, ctx));
                self.surface(message);
            }
            None => log::warn!("Ignoring unknown media error code {}", code),
        }
    }

    pub fn report_end_of_stream(&mut self, now: Duration) {
        self.drive(now, |machine, ctx| machine.report_end_of_stream(ctx));
    }

    pub fn submit_local(&mut self, submission: LocalSubmission, now: Duration) -> Result<Comment, SubmitError> {
        self.submit_local_at(submission, Local::now(), now)
    }

    /// Render the submission right away, then send it to the store. A store
    /// failure keeps the local preview on screen.
    pub fn submit_local_at(
        &mut self,
        submission: LocalSubmission,
        authored: DateTime<Local>,
        now: Duration,
    ) -> Result<Comment, SubmitError> {
        let position = self.clock.current_position();
        let comment = self.bullets.submit_local(submission, position, authored, now)?;
        self.scheduler.mark_spawned(comment.id.clone());
        self.emit(PlayerEvent::CommentSpawned(comment.id.clone()));

        let outcome = match self.store.submit(&comment) {
            Ok(response) if response.accepted => Ok(response.all_comments),
            Ok(_) => Err(StoreError::Rejected),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(all_comments) => {
                let count = all_comments.len();
                self.scheduler.load(all_comments);
                self.emit(PlayerEvent::CommentsLoaded(count));
            }
            Err(e) => {
                log::warn!("Failed to submit comment {}: {}", comment.id, e);
                self.emit(PlayerEvent::SubmitFailed(e.to_string()));
            }
        }

        Ok(comment)
    }

    /// The bullet screen switch. Turning it on reloads the comment set.
    pub fn set_bullet_screen_enabled(&mut self, on: bool) {
        let removed = self.bullets.set_switched_on(on);
        if !on {
            self.scheduler.rewind();
        }
        self.emit_removed(removed);

        if on && self.bullets.is_accepting() {
            if let Err(e) = self.refresh_comments() {
                log::warn!("Failed to reload comments: {}", e);
            }
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn signs(&self) -> ControlSigns {
        ControlSigns::for_state(self.machine.state())
    }

    pub fn surfaced_error(&self) -> Option<&'static str> {
        self.surfaced_error
    }

    pub fn snapshot(&self, now: Duration) -> OverlaySnapshot {
        self.bullets.snapshot(now)
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn bullets(&self) -> &BulletScreen {
        &self.bullets
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
