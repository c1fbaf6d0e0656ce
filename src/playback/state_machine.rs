// =============================================================================
// PLAYBACK STATE MACHINE
// =============================================================================
//
// Reacts to the single toggle control and to MediaClock status reports, and
// keeps the bullet screen frozen or moving in step with playback.
//
// =============================================================================

use std::time::Duration;

use crate::danmaku::{BulletScreen, Scheduler};
use crate::playback::{MediaClock, MediaError, NetworkState, PlayRejection, PlaybackState, ReadyState};

/// Everything a transition may act on, borrowed from the coordinator.
pub struct PlaybackContext<'a> {
    pub clock: &'a mut dyn MediaClock,
    pub bullets: &'a mut BulletScreen,
    pub scheduler: &'a mut Scheduler,
    /// Wall-clock time of the triggering event.
    pub now: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("controls are disabled in the {0} state")]
    Disabled(&'static str),
}

pub struct PlaybackStateMachine {
    state: PlaybackState,
    /// Controls respond only after the media first reports enough data.
    controls_bound: bool,
    changes: Vec<StateChange>,
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Loading,
            controls_bound: false,
            changes: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn controls_bound(&self) -> bool {
        self.controls_bound
    }

    /// Transitions since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.changes)
    }

    fn set_state(&mut self, to: PlaybackState) {
        if self.state == to {
            return;
        }
        let change = StateChange { from: self.state, to };
        log::info!("Playback state {} -> {}", change.from.name(), change.to.name());
        self.state = to;
        self.changes.push(change);
    }

    /// The play/pause control. Never fails; inert in `Error` and before the
    /// media is first ready.
    pub fn toggle(&mut self, ctx: &mut PlaybackContext<'_>) {
        if !self.controls_bound {
            log::debug!("Toggle ignored in {} state", self.state.name());
            return;
        }

        match self.state {
            PlaybackState::Error(_) => {}
            PlaybackState::Loading | PlaybackState::Playing => {
                ctx.clock.pause();
                ctx.bullets.on_pause(ctx.now);
                self.set_state(PlaybackState::Pausing);
            }
            PlaybackState::Pausing => self.play(ctx),
            PlaybackState::ReplayPending => self.replay(ctx),
        }
    }

    fn play(&mut self, ctx: &mut PlaybackContext<'_>) {
        self.set_state(PlaybackState::Playing);
        request_play(ctx.clock);
        ctx.bullets.on_resume(ctx.now);
    }

    fn replay(&mut self, ctx: &mut PlaybackContext<'_>) {
        ctx.bullets.on_seek_or_replay();
        ctx.scheduler.rewind();
        ctx.clock.load();
        ctx.clock.seek(0.0);
        ctx.scheduler.start(ctx.now);
        self.play(ctx);
    }

    pub fn report_buffer_level(&mut self, level: ReadyState, ctx: &mut PlaybackContext<'_>) {
        if matches!(self.state, PlaybackState::Error(_) | PlaybackState::ReplayPending) {
            return;
        }

        if !self.controls_bound {
            if level == ReadyState::EnoughData {
                self.controls_bound = true;
                if ctx.clock.is_paused() {
                    self.set_state(PlaybackState::Pausing);
                } else {
                    self.set_state(PlaybackState::Playing);
                    ctx.bullets.on_resume(ctx.now);
                }
            }
            return;
        }

        // a paused clock is not starving for data
        if ctx.clock.is_paused() {
            return;
        }

        if !level.can_play() {
            if self.state != PlaybackState::Loading {
                self.set_state(PlaybackState::Loading);
                ctx.bullets.on_pause(ctx.now);
            }
        } else if self.state == PlaybackState::Loading {
            self.set_state(PlaybackState::Playing);
            ctx.bullets.on_resume(ctx.now);
        }
    }

    /// Returns the message to surface, exactly once per session. Aborts are
    /// ignored.
    pub fn report_error(&mut self, error: MediaError, ctx: &mut PlaybackContext<'_>) -> Option<&'static str> {
        if self.state.is_error() {
            return None;
        }

        let message = match error.user_message() {
            Some(message) => message,
            None => {
                log::debug!("Ignoring {}", error);
                return None;
            }
        };

        // timers go before the comments they would touch
        ctx.scheduler.stop();
        let cleared = ctx.bullets.halt();
        self.controls_bound = false;
        self.set_state(PlaybackState::Error(error));

        log::error!("Playback failed ({}), cleared {} comments", error, cleared.len());
        Some(message)
    }

    pub fn report_end_of_stream(&mut self, ctx: &mut PlaybackContext<'_>) {
        if self.state != PlaybackState::Playing {
            return;
        }
        ctx.scheduler.stop();
        ctx.bullets.on_pause(ctx.now);
        self.set_state(PlaybackState::ReplayPending);
    }

    /// Feed one MediaClock status snapshot through the machine.
    pub fn poll(&mut self, ctx: &mut PlaybackContext<'_>) -> Option<&'static str> {
        let status = ctx.clock.status();

        let fatal = status
            .error
            .filter(|error| *error != MediaError::Aborted)
            .or((status.network == NetworkState::NoSource).then_some(MediaError::ResourceMissing));
        if let Some(error) = fatal {
            return self.report_error(error, ctx);
        }

        self.report_buffer_level(status.ready, ctx);
        if status.ended {
            self.report_end_of_stream(ctx);
        }
        None
    }

    pub fn seek(&mut self, seconds: f64, ctx: &mut PlaybackContext<'_>) -> Result<(), ControlError> {
        if !self.controls_bound {
            return Err(ControlError::Disabled(self.state.name()));
        }

        ctx.bullets.on_seek_or_replay();
        ctx.scheduler.rewind();
        ctx.clock.seek(seconds);
        ctx.scheduler.start(ctx.now);

        if self.state == PlaybackState::ReplayPending {
            ctx.clock.pause();
            self.set_state(PlaybackState::Pausing);
        }
        Ok(())
    }
}

fn request_play(clock: &mut dyn MediaClock) {
    match clock.play() {
        Ok(()) => {}
        Err(PlayRejection::Interrupted) => log::debug!("Play request interrupted by pause"),
        Err(e) => log::warn!("{}", e),
    }
}
