//! Engine-side types: events, commands and the shared playback clock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::error::LoadError;

/// Identifies one `load` request. Increases monotonically per engine.
pub type LoadSeq = u64;

/// Tag metadata read from the loaded file, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl TrackInfo {
    /// "Artist - Title", or just the title when the artist is missing.
    pub fn display(&self) -> Option<String> {
        let title = self.title.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => Some(format!("{} - {}", a, title)),
            _ => Some(title.to_string()),
        }
    }
}

/// Lifecycle notifications emitted by an engine, once per transition.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The source for `seq` decoded and is ready to play from 0.
    MetadataReady {
        seq: LoadSeq,
        duration: Option<f64>,
        info: TrackInfo,
    },
    /// The source for `seq` could not be decoded.
    LoadFailed { seq: LoadSeq, error: LoadError },
    Started,
    Paused,
    /// Playback ran off the end of the track.
    Ended,
    VolumeChanged { muted: bool },
}

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Drop the current source; anything installed for an older seq is stale.
    Reset { seq: LoadSeq },
    /// Install a decoded source, unless a newer `Reset` superseded it.
    Install {
        seq: LoadSeq,
        bytes: Arc<[u8]>,
        duration: Option<Duration>,
        info: TrackInfo,
    },
    /// Resume, optionally rebuilding the sink at the given offset first.
    Play { at: Option<Duration> },
    Pause,
    Seek(Duration),
    SetMuted(bool),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Playback position bookkeeping shared with the engine handle.
///
/// The audio thread owns the truth; the handle reads it to answer
/// `position()` without a round trip.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    /// Time played before the current run started.
    pub accumulated: Duration,
    /// When the current run started, if playing.
    pub started_at: Option<Instant>,
    pub duration: Option<Duration>,
}

impl PlaybackClock {
    pub fn position(&self) -> Duration {
        let pos = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }
}

pub type ClockHandle = Arc<Mutex<PlaybackClock>>;

/// Convert seconds to a `Duration`, mapping negative or non-finite input to zero.
pub(super) fn to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
