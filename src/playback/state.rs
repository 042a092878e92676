//! Playback phases, state snapshots and the derived display view.

use crate::timefmt::{self, SENTINEL};

/// Where the player is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// No track.
    #[default]
    Idle,
    /// A file was selected and is being decoded.
    Loading,
    /// A track is loaded and has not been played yet.
    Ready,
    Playing,
    Paused,
    /// A seek drag is in progress; always followed by `Paused`.
    Dragging,
    /// The engine ran off the end of the track.
    Ended,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "No file",
            Phase::Loading => "Loading",
            Phase::Ready => "Ready",
            Phase::Playing => "Playing",
            Phase::Paused => "Paused",
            Phase::Dragging => "Seeking",
            Phase::Ended => "Ended",
        }
    }

    /// Whether the play/pause control should offer "pause".
    pub fn is_playing(self) -> bool {
        self == Phase::Playing
    }
}

/// Immutable snapshot of the player.
///
/// While dragging, `position` is the preview position, not the engine's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub phase: Phase,
    pub position: f64,
    pub duration: Option<f64>,
    pub is_muted: bool,
}

impl PlaybackState {
    /// Indicator position as a percentage of the duration.
    pub fn indicator_percent(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 && self.position.is_finite() => {
                (self.position / d * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

/// Everything the display needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub phase: Phase,
    pub position_text: String,
    pub duration_text: String,
    pub indicator_percent: f64,
    pub is_muted: bool,
    pub title: Option<String>,
    pub error: Option<String>,
}

impl View {
    pub fn new(state: &PlaybackState, title: Option<String>, error: Option<String>) -> Self {
        let position_text = match state.phase {
            Phase::Idle | Phase::Loading => SENTINEL.to_string(),
            _ => timefmt::or_sentinel(Some(state.position)),
        };

        Self {
            phase: state.phase,
            position_text,
            duration_text: timefmt::or_sentinel(state.duration),
            indicator_percent: state.indicator_percent(),
            is_muted: state.is_muted,
            title,
            error,
        }
    }
}
