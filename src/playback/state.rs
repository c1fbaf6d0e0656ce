// =============================================================================
// PLAYBACK STATE
// =============================================================================
//
// Playback states, the media error taxonomy, and what each state looks like
// on the control surface.
//
// =============================================================================

/// Fatal (or ignorable) media failures reported by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MediaError {
    /// Fetching was aborted at the user's request. Never surfaced.
    #[error("media fetch aborted")]
    Aborted,
    #[error("network error while fetching media")]
    Network,
    #[error("media decode error")]
    Decode,
    #[error("media format not supported")]
    Unsupported,
    #[error("media resource missing")]
    ResourceMissing,
}

impl MediaError {
    /// Map a media element error code (1-4) to an error kind.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(MediaError::Aborted),
            2 => Some(MediaError::Network),
            3 => Some(MediaError::Decode),
            4 => Some(MediaError::Unsupported),
            _ => None,
        }
    }

    /// Message shown in the error prompt. `None` for errors the user never sees.
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            MediaError::Aborted => None,
            MediaError::Network => Some("Oops, the network seems to have failed!\nTry refreshing the page :P"),
            MediaError::Decode => Some("Hmm, the video could not be decoded.\nTry another video :)"),
            MediaError::Unsupported => Some("The video does not exist or this format is not supported :(\nTry another video"),
            MediaError::ResourceMissing => Some("The resource at this video address seems to be gone!\nRefresh the page or try another video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Loading,
    Playing,
    Pausing,
    /// Playback reached the end; the next control click replays from zero.
    ReplayPending,
    Error(MediaError),
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Pausing => "pausing",
            PlaybackState::ReplayPending => "replay-pending",
            PlaybackState::Error(_) => "error",
        }
    }
}

/// Visibility of the control-surface signs for a playback state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSigns {
    pub video_opacity: f32,
    pub loading_spinner: bool,
    pub play_circle: bool,
    pub play_button: bool,
    pub pause_button: bool,
    pub replay_button: bool,
    pub error_prompt: Option<&'static str>,
}

impl ControlSigns {
    pub fn for_state(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Loading => Self {
                video_opacity: 0.5,
                loading_spinner: true,
                play_circle: false,
                play_button: false,
                pause_button: true,
                replay_button: false,
                error_prompt: None,
            },
            PlaybackState::Playing => Self {
                video_opacity: 1.0,
                loading_spinner: false,
                play_circle: false,
                play_button: false,
                pause_button: true,
                replay_button: false,
                error_prompt: None,
            },
            PlaybackState::Pausing => Self {
                video_opacity: 0.5,
                loading_spinner: false,
                play_circle: true,
                play_button: true,
                pause_button: false,
                replay_button: false,
                error_prompt: None,
            },
            PlaybackState::ReplayPending => Self {
                video_opacity: 0.5,
                loading_spinner: false,
                play_circle: false,
                play_button: true,
                pause_button: false,
                replay_button: true,
                error_prompt: None,
            },
            PlaybackState::Error(error) => Self {
                video_opacity: 0.0,
                loading_spinner: false,
                play_circle: false,
                play_button: true,
                pause_button: false,
                replay_button: false,
                error_prompt: error.user_message(),
            },
        }
    }
}
