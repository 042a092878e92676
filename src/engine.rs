//! Media engine: the playback primitive the state machine drives.
//!
//! `MediaEngine` is the seam between the playback state machine and whatever
//! actually produces sound. `RodioEngine` is the real implementation; it runs
//! a dedicated audio thread and reports lifecycle changes as `EngineEvent`s.

mod error;
mod handle;
mod probe;
mod sink;
mod thread;
mod types;

#[cfg(test)]
pub mod fake;

pub use error::{EngineError, LoadError};
pub use handle::RodioEngine;
pub use types::{EngineEvent, LoadSeq, TrackInfo};

/// Operations the playback state machine needs from a media backend.
///
/// All methods return immediately. `load` completes asynchronously and
/// reports back through `poll_event` with the sequence number it returned.
pub trait MediaEngine {
    /// Start loading a new source, discarding the current one.
    fn load(&mut self, bytes: Vec<u8>) -> LoadSeq;
    /// Resume playback, optionally seeking to `at` seconds first.
    fn play(&mut self, at: Option<f64>) -> Result<(), EngineError>;
    /// Pause playback. No-op when already paused.
    fn pause(&mut self);
    /// Move the playback position without changing play/pause state.
    fn seek(&mut self, seconds: f64) -> Result<(), EngineError>;
    /// Current engine position in seconds.
    fn position(&self) -> f64;
    /// Track duration in seconds, once known.
    fn duration(&self) -> Option<f64>;
    fn set_muted(&mut self, muted: bool);
    fn muted(&self) -> bool;
    /// Next pending lifecycle event, if any.
    fn poll_event(&mut self) -> Option<EngineEvent>;
}
