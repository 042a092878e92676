use tracing::{debug, warn};

use crate::engine::{EngineEvent, LoadError, LoadSeq, MediaEngine, TrackInfo};
use crate::seek::{SeekController, TrackRect};
use crate::ticker::{PositionTicker, TickSample};

use super::state::{Phase, PlaybackState, View};

/// The loaded audio source.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Name the file was selected under.
    pub name: String,
    pub duration: Option<f64>,
    pub info: TrackInfo,
}

impl Track {
    /// Tag title when present, otherwise the file name.
    pub fn display(&self) -> String {
        self.info.display().unwrap_or_else(|| self.name.clone())
    }
}

#[derive(Debug)]
struct PendingLoad {
    seq: LoadSeq,
    name: String,
}

/// The playback state machine.
///
/// Commands arriving without a loaded track are ignored. Numeric input is
/// clamped, never rejected.
pub struct Player<E: MediaEngine> {
    engine: E,
    ticker: PositionTicker,
    seek: SeekController,

    phase: Phase,
    position: f64,
    duration: Option<f64>,
    muted: bool,

    track: Option<Track>,
    pending: Option<PendingLoad>,
    last_error: Option<String>,
}

impl<E: MediaEngine> Player<E> {
    pub fn new(engine: E) -> Self {
        let muted = engine.muted();
        Self {
            engine,
            ticker: PositionTicker::new(),
            seek: SeekController::new(),
            phase: Phase::Idle,
            position: 0.0,
            duration: None,
            muted,
            track: None,
            pending: None,
            last_error: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[cfg(test)]
    pub fn ticker(&self) -> &PositionTicker {
        &self.ticker
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> PlaybackState {
        let position = match self.phase {
            Phase::Dragging => self.seek.preview().unwrap_or(self.position),
            _ => self.position,
        };
        PlaybackState {
            phase: self.phase,
            position,
            duration: self.duration,
            is_muted: self.muted,
        }
    }

    pub fn view(&self) -> View {
        let title = match (self.track(), &self.pending) {
            (_, Some(p)) => Some(p.name.clone()),
            (Some(t), None) => Some(t.display()),
            (None, None) => None,
        };
        View::new(&self.snapshot(), title, self.last_error().map(str::to_string))
    }

    /// The single place phases change. The ticker runs exactly while `Playing`.
    fn set_phase(&mut self, next: Phase) {
        let prev = std::mem::replace(&mut self.phase, next);
        match next {
            Phase::Playing if prev != Phase::Playing => {
                self.ticker.start();
            }
            Phase::Playing => {}
            _ => {
                self.ticker.stop();
            }
        }
        if prev != next {
            debug!(from = ?prev, to = ?next, ticking = self.ticker.is_running(), "phase change");
        }
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        let s = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        match self.duration {
            Some(d) => s.min(d),
            None => s,
        }
    }

    /// Replace whatever is loaded with a new file. Always enters `Loading`.
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> LoadSeq {
        self.seek.cancel();
        let seq = self.engine.load(bytes);

        self.track = None;
        self.duration = None;
        self.position = 0.0;
        self.last_error = None;
        self.pending = Some(PendingLoad {
            seq,
            name: name.into(),
        });
        self.set_phase(Phase::Loading);
        seq
    }

    /// Apply one engine event. A failed load is reported back as `Err`.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Result<(), LoadError> {
        match event {
            EngineEvent::MetadataReady {
                seq,
                duration,
                info,
            } => {
                let Some(pending) = self.pending.take_if(|p| p.seq == seq) else {
                    warn!(seq, "ignoring metadata from a superseded load");
                    return Ok(());
                };
                self.duration = duration
                    .or_else(|| self.engine.duration())
                    .filter(|d| d.is_finite() && *d >= 0.0);
                self.position = 0.0;
                self.track = Some(Track {
                    name: pending.name,
                    duration: self.duration,
                    info,
                });
                self.set_phase(Phase::Ready);
            }
            EngineEvent::LoadFailed { seq, error } => {
                let Some(pending) = self.pending.take_if(|p| p.seq == seq) else {
                    warn!(seq, "ignoring failure from a superseded load");
                    return Ok(());
                };
                warn!(seq, %error, "load failed");
                self.track = None;
                self.duration = None;
                self.position = 0.0;
                self.last_error = Some(format!("{}: {}", pending.name, error));
                self.set_phase(Phase::Idle);
                return Err(error);
            }
            EngineEvent::Started => match self.phase {
                Phase::Ready | Phase::Paused | Phase::Ended => {
                    self.position = self.clamp_position(self.engine.position());
                    self.set_phase(Phase::Playing);
                }
                _ => {}
            },
            EngineEvent::Paused => {
                if self.phase == Phase::Playing {
                    self.position = self.clamp_position(self.engine.position());
                    self.set_phase(Phase::Paused);
                }
            }
            EngineEvent::Ended => {
                if self.phase == Phase::Playing {
                    // Ready to replay: the display snaps back to the start.
                    self.position = 0.0;
                    self.set_phase(Phase::Ended);
                }
            }
            EngineEvent::VolumeChanged { muted } => self.muted = muted,
        }
        Ok(())
    }

    /// Drain and apply every pending engine event. Returns the last load
    /// failure seen, if any.
    pub fn pump_engine_events(&mut self) -> Result<(), LoadError> {
        let mut result = Ok(());
        while let Some(event) = self.engine.poll_event() {
            if let Err(e) = self.handle_engine_event(event) {
                result = Err(e);
            }
        }
        result
    }

    /// One display frame: sample the engine position if the ticker runs.
    pub fn on_frame(&mut self) -> bool {
        let engine = &self.engine;
        let sample = self.ticker.frame(|| engine.position());
        match sample {
            Some(sample) => self.apply_tick(sample),
            None => false,
        }
    }

    /// Apply a ticker sample. Samples from a cancelled registration are dropped.
    pub fn apply_tick(&mut self, sample: TickSample) -> bool {
        if self.phase != Phase::Playing || !self.ticker.is_live(sample.handle) {
            return false;
        }
        self.position = self.clamp_position(sample.position);
        true
    }

    /// Start or resume playback, optionally from `at` seconds.
    pub fn play(&mut self, at: Option<f64>) {
        if self.track.is_none() {
            debug!("play ignored: no track loaded");
            return;
        }

        let at = match self.phase {
            Phase::Ready | Phase::Paused => at,
            Phase::Ended => Some(at.unwrap_or(0.0)),
            Phase::Playing if at.is_some() => at,
            _ => return,
        };
        let at = at.map(|s| self.clamp_position(s));

        if let Err(e) = self.engine.play(at) {
            debug!(error = %e, "engine refused play");
            return;
        }
        if let Some(at) = at {
            self.position = at;
        }
        self.set_phase(Phase::Playing);
    }

    /// Pause playback. No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.engine.pause();
        self.position = self.clamp_position(self.engine.position());
        self.set_phase(Phase::Paused);
    }

    pub fn toggle_play_pause(&mut self) {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Ready | Phase::Paused | Phase::Ended => self.play(None),
            _ => {}
        }
    }

    /// Jump by `delta` seconds, clamped to the track. Play/pause state is
    /// kept; reaching the end does not end the track.
    pub fn seek_by(&mut self, delta: f64) {
        if self.track.is_none() || !delta.is_finite() {
            return;
        }

        let base = match self.phase {
            Phase::Playing => self.clamp_position(self.engine.position()),
            Phase::Ready | Phase::Paused => self.position,
            Phase::Ended => 0.0,
            _ => return,
        };
        let target = self.clamp_position(base + delta);

        if let Err(e) = self.engine.seek(target) {
            debug!(error = %e, "engine refused seek");
            return;
        }
        self.position = target;
        if self.phase == Phase::Ended {
            self.set_phase(Phase::Paused);
        }
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.muted;
        self.engine.set_muted(muted);
        self.muted = muted;
    }

    /// Pointer down on the seek track: stop sampling, pause, start previewing.
    pub fn drag_start(&mut self, pointer_x: f64, track: TrackRect) {
        if self.track.is_none() {
            return;
        }
        let Some(duration) = self.duration.filter(|d| *d > 0.0) else {
            return;
        };

        match self.phase {
            Phase::Playing => {
                self.engine.pause();
                self.position = self.clamp_position(self.engine.position());
            }
            Phase::Ready | Phase::Paused | Phase::Ended => {}
            _ => return,
        }

        self.seek.begin(pointer_x, track, duration);
        self.set_phase(Phase::Dragging);
    }

    /// Pointer moved while dragging: only the preview changes.
    pub fn drag_move(&mut self, pointer_x: f64) {
        if self.phase != Phase::Dragging {
            return;
        }
        self.seek.update(pointer_x);
    }

    /// Pointer released: write the preview into the engine and stay paused.
    pub fn drag_commit(&mut self) {
        if self.phase != Phase::Dragging {
            return;
        }
        let Some(preview) = self.seek.commit() else {
            return;
        };
        let target = self.clamp_position(preview);

        if let Err(e) = self.engine.seek(target) {
            warn!(error = %e, "engine refused drag commit");
        }
        self.position = target;
        self.set_phase(Phase::Paused);
    }
}
