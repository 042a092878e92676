use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use super::MediaEngine;
use super::error::EngineError;
use super::probe::probe;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, ClockHandle, EngineEvent, LoadSeq, PlaybackClock, to_duration};

/// `MediaEngine` backed by rodio on a dedicated audio thread.
pub struct RodioEngine {
    tx: Sender<AudioCmd>,
    events_tx: Sender<EngineEvent>,
    events: Receiver<EngineEvent>,
    clock: ClockHandle,
    join: Option<JoinHandle<()>>,

    latest_seq: LoadSeq,
    // Set once the latest load reports metadata.
    loaded: bool,
    duration: Option<f64>,
    muted: bool,
}

impl RodioEngine {
    /// Spawn the audio thread and wait until it has opened the output device.
    pub fn new() -> Result<Self, EngineError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events) = mpsc::channel::<EngineEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let clock: ClockHandle = Arc::new(Mutex::new(PlaybackClock::default()));

        let join = spawn_audio_thread(rx, events_tx.clone(), clock.clone(), ready_tx);
        ready_rx.recv().map_err(|_| EngineError::Disconnected)??;

        Ok(Self {
            tx,
            events_tx,
            events,
            clock,
            join: Some(join),
            latest_seq: 0,
            loaded: false,
            duration: None,
            muted: false,
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), EngineError> {
        self.tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    /// Fade out, stop the audio thread and wait for it to exit.
    pub fn quit_softly(&mut self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl MediaEngine for RodioEngine {
    fn load(&mut self, bytes: Vec<u8>) -> LoadSeq {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        self.loaded = false;
        self.duration = None;

        let _ = self.send(AudioCmd::Reset { seq });

        // Decode off the audio thread; it only ever receives ready sources.
        let tx = self.tx.clone();
        let events = self.events_tx.clone();
        let bytes: Arc<[u8]> = bytes.into();
        thread::spawn(move || match probe(&bytes) {
            Ok(probed) => {
                let _ = tx.send(AudioCmd::Install {
                    seq,
                    bytes,
                    duration: probed.duration,
                    info: probed.info,
                });
            }
            Err(error) => {
                let _ = events.send(EngineEvent::LoadFailed { seq, error });
            }
        });

        debug!(seq, "load requested");
        seq
    }

    fn play(&mut self, at: Option<f64>) -> Result<(), EngineError> {
        if !self.loaded {
            return Err(EngineError::NotReady);
        }
        self.send(AudioCmd::Play {
            at: at.map(to_duration),
        })
    }

    fn pause(&mut self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        if !self.loaded {
            return Err(EngineError::NotReady);
        }
        self.send(AudioCmd::Seek(to_duration(seconds)))
    }

    fn position(&self) -> f64 {
        self.clock
            .lock()
            .map(|c| c.position().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let _ = self.send(AudioCmd::SetMuted(muted));
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let event = self.events.try_recv().ok()?;
        match &event {
            EngineEvent::MetadataReady { seq, duration, .. } if *seq == self.latest_seq => {
                self.loaded = true;
                self.duration = *duration;
            }
            EngineEvent::VolumeChanged { muted } => self.muted = *muted,
            _ => {}
        }
        Some(event)
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.quit_softly(Duration::ZERO);
        }
    }
}
