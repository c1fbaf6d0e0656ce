pub mod media_clock;
pub mod state;
pub mod state_machine;

pub use media_clock::{MediaClock, MediaStatus, NetworkState, PlayRejection, ReadyState, SimulatedClock};
pub use state::{ControlSigns, MediaError, PlaybackState};
pub use state_machine::{ControlError, PlaybackContext, PlaybackStateMachine, StateChange};
