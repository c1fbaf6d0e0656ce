pub mod core;
pub mod danmaku;
pub mod playback;
pub mod player;
pub mod store;

#[cfg(test)]
mod player_test;

pub use player::{Player, PlayerEvent};
