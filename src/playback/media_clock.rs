// =============================================================================
// MEDIA CLOCK - THE PLAYABLE RESOURCE THE OVERLAY FOLLOWS
// =============================================================================
//
// The overlay never decodes anything itself. It reads position and status from
// a MediaClock and issues play/pause/seek commands to it. SimulatedClock is a
// deterministic implementation driven by explicit steps, used by the demo
// binary and by tests.
//
// =============================================================================

use crate::playback::MediaError;

/// How much media data is available around the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Nothing = 0,
    Metadata = 1,
    CurrentData = 2,
    FutureData = 3,
    EnoughData = 4,
}

impl ReadyState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ReadyState::Nothing,
            1 => ReadyState::Metadata,
            2 => ReadyState::CurrentData,
            3 => ReadyState::FutureData,
            _ => ReadyState::EnoughData,
        }
    }

    /// At least a little data beyond the current frame is buffered.
    pub fn can_play(self) -> bool {
        self >= ReadyState::FutureData
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Empty = 0,
    Idle = 1,
    Loading = 2,
    NoSource = 3,
}

impl NetworkState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => NetworkState::Empty,
            1 => NetworkState::Idle,
            2 => NetworkState::Loading,
            _ => NetworkState::NoSource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStatus {
    pub ready: ReadyState,
    pub network: NetworkState,
    pub error: Option<MediaError>,
    pub ended: bool,
}

/// Why a play request did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayRejection {
    #[error("the play() request was interrupted by a call to pause()")]
    Interrupted,
    #[error("play request rejected: {0}")]
    Other(String),
}

pub trait MediaClock {
    /// Current playback position in seconds.
    fn current_position(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn playback_rate(&self) -> f64 {
        1.0
    }
    fn play(&mut self) -> Result<(), PlayRejection>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// Reload the resource from the start.
    fn load(&mut self);
    fn status(&self) -> MediaStatus;
}

/// A media clock whose position only moves when [`SimulatedClock::step`] is called.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    position: f64,
    duration: f64,
    paused: bool,
    rate: f64,
    ready: ReadyState,
    network: NetworkState,
    error: Option<MediaError>,
    reject_next_play: Option<PlayRejection>,
    play_requests: u32,
}

impl SimulatedClock {
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
            paused: true,
            rate: 1.0,
            ready: ReadyState::Nothing,
            network: NetworkState::Loading,
            error: None,
            reject_next_play: None,
            play_requests: 0,
        }
    }

    /// Advance media time by `seconds` of wall time when playing with data.
    pub fn step(&mut self, seconds: f64) {
        if self.paused || !self.ready.can_play() || self.error.is_some() {
            return;
        }
        self.position = (self.position + seconds * self.rate).min(self.duration);
        if self.position >= self.duration {
            self.paused = true;
        }
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
    }

    pub fn set_ready_state(&mut self, ready: ReadyState) {
        self.ready = ready;
        if ready.can_play() {
            self.network = NetworkState::Idle;
        }
    }

    pub fn set_network_state(&mut self, network: NetworkState) {
        self.network = network;
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate.max(0.0);
    }

    pub fn fail_with(&mut self, error: MediaError) {
        self.error = Some(error);
    }

    pub fn reject_next_play(&mut self, rejection: PlayRejection) {
        self.reject_next_play = Some(rejection);
    }

    pub fn play_requests(&self) -> u32 {
        self.play_requests
    }

    fn ended(&self) -> bool {
        self.duration > 0.0 && self.position >= self.duration
    }
}

impl MediaClock for SimulatedClock {
    fn current_position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        self.play_requests += 1;
        if let Some(rejection) = self.reject_next_play.take() {
            return Err(rejection);
        }
        if self.ended() {
            self.position = 0.0;
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.set_position(seconds);
    }

    fn load(&mut self) {
        self.position = 0.0;
        self.paused = true;
        self.error = None;
    }

    fn status(&self) -> MediaStatus {
        MediaStatus {
            ready: self.ready,
            network: self.network,
            error: self.error,
            ended: self.ended(),
        }
    }
}
