//! Playback state machine and the snapshots it hands to the display.
//!
//! `Player` owns the media engine, the position ticker and the seek
//! controller, and is the only place phase transitions happen.

mod machine;
mod state;

pub use machine::{Player, Track};
pub use state::{Phase, PlaybackState, View};

#[cfg(test)]
mod tests;
