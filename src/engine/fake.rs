//! Scripted engine for exercising the playback state machine without audio.

use std::collections::VecDeque;

use super::error::{EngineError, LoadError};
use super::types::{EngineEvent, LoadSeq, TrackInfo};
use super::MediaEngine;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(LoadSeq),
    Play(Option<f64>),
    Pause,
    Seek(f64),
    SetMuted(bool),
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<Call>,
    pub position: f64,
    pub playing: bool,
    pub loaded: bool,
    duration: Option<f64>,
    muted: bool,
    latest_seq: LoadSeq,
    pending: VecDeque<EngineEvent>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event as if the engine had emitted it.
    pub fn push_event(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    /// Finish the latest load successfully and return the event it emits.
    pub fn finish_load(&mut self, duration: f64) -> EngineEvent {
        self.loaded = true;
        self.duration = Some(duration);
        self.position = 0.0;
        EngineEvent::MetadataReady {
            seq: self.latest_seq,
            duration: Some(duration),
            info: TrackInfo::default(),
        }
    }

    /// Fail the latest load and return the event it emits.
    pub fn fail_load(&mut self) -> EngineEvent {
        EngineEvent::LoadFailed {
            seq: self.latest_seq,
            error: LoadError::Decode("unsupported format".into()),
        }
    }

    /// Simulate the track running out while playing.
    pub fn run_to_end(&mut self) -> EngineEvent {
        self.playing = false;
        self.position = self.duration.unwrap_or(self.position);
        EngineEvent::Ended
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Seek(s) => Some(*s),
                Call::Play(Some(s)) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, _bytes: Vec<u8>) -> LoadSeq {
        self.latest_seq += 1;
        self.loaded = false;
        self.playing = false;
        self.position = 0.0;
        self.duration = None;
        self.calls.push(Call::Load(self.latest_seq));
        self.latest_seq
    }

    fn play(&mut self, at: Option<f64>) -> Result<(), EngineError> {
        self.calls.push(Call::Play(at));
        if !self.loaded {
            return Err(EngineError::NotReady);
        }
        if let Some(at) = at {
            self.position = at;
        }
        if !self.playing {
            self.playing = true;
            self.pending.push_back(EngineEvent::Started);
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        if self.playing {
            self.playing = false;
            self.pending.push_back(EngineEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        self.calls.push(Call::Seek(seconds));
        if !self.loaded {
            return Err(EngineError::NotReady);
        }
        self.position = seconds;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_muted(&mut self, muted: bool) {
        self.calls.push(Call::SetMuted(muted));
        if self.muted != muted {
            self.muted = muted;
            self.pending.push_back(EngineEvent::VolumeChanged { muted });
        }
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.pending.pop_front()
    }
}
