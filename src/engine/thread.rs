use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::error::EngineError;
use super::sink::{create_sink_at, volume_for};
use super::types::{AudioCmd, ClockHandle, EngineEvent, LoadSeq, PlaybackClock, TrackInfo};

/// How often the thread wakes up to check for end of track.
const END_POLL: Duration = Duration::from_millis(50);

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<EngineEvent>,
    clock: ClockHandle,
    ready: SyncSender<Result<(), EngineError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "failed to open audio output");
                let _ = ready.send(Err(EngineError::Output(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut deck = Deck::new(stream, events, clock);

        loop {
            match rx.recv_timeout(END_POLL) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    deck.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => deck.apply(cmd),
                Err(RecvTimeoutError::Timeout) => deck.check_ended(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Everything the audio thread owns: the output stream, the current sink and
/// the play clock.
struct Deck {
    stream: OutputStream,
    events: Sender<EngineEvent>,
    clock: ClockHandle,

    latest_seq: LoadSeq,
    source: Option<Arc<[u8]>>,
    duration: Option<Duration>,
    sink: Option<Sink>,

    paused: bool,
    muted: bool,

    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Deck {
    fn new(stream: OutputStream, events: Sender<EngineEvent>, clock: ClockHandle) -> Self {
        Self {
            stream,
            events,
            clock,
            latest_seq: 0,
            source: None,
            duration: None,
            sink: None,
            paused: true,
            muted: false,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    fn apply(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Reset { seq } => self.reset(seq),
            AudioCmd::Install {
                seq,
                bytes,
                duration,
                info,
            } => self.install(seq, bytes, duration, info),
            AudioCmd::Play { at } => self.play(at),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Seek(at) => {
                if self.source.is_some() {
                    self.rebuild_at(at);
                }
            }
            AudioCmd::SetMuted(muted) => self.set_muted(muted),
            // Handled by the receive loop.
            AudioCmd::Quit { .. } => {}
        }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn position(&self) -> Duration {
        let pos = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        self.clamp(pos)
    }

    fn clamp(&self, at: Duration) -> Duration {
        match self.duration {
            Some(d) => at.min(d),
            None => at,
        }
    }

    /// Copy the clock into the shared handle read by `RodioEngine::position`.
    fn publish(&self) {
        if let Ok(mut c) = self.clock.lock() {
            *c = PlaybackClock {
                accumulated: self.accumulated,
                started_at: self.started_at,
                duration: self.duration,
            };
        }
    }

    fn reset(&mut self, seq: LoadSeq) {
        self.latest_seq = self.latest_seq.max(seq);
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.source = None;
        self.duration = None;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.publish();
    }

    fn install(
        &mut self,
        seq: LoadSeq,
        bytes: Arc<[u8]>,
        duration: Option<Duration>,
        info: TrackInfo,
    ) {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "dropping superseded source");
            return;
        }

        match create_sink_at(&self.stream, &bytes, Duration::ZERO, self.muted) {
            Ok(sink) => {
                self.sink = Some(sink);
                self.source = Some(bytes);
                self.duration = duration;
                self.paused = true;
                self.started_at = None;
                self.accumulated = Duration::ZERO;
                self.publish();
                self.emit(EngineEvent::MetadataReady {
                    seq,
                    duration: duration.map(|d| d.as_secs_f64()),
                    info,
                });
            }
            Err(error) => {
                warn!(seq, %error, "decoded source could not be attached to a sink");
                self.emit(EngineEvent::LoadFailed { seq, error });
            }
        }
    }

    /// Replace the sink with a fresh one positioned at `at`, keeping the
    /// current play/pause state.
    fn rebuild_at(&mut self, at: Duration) {
        let Some(bytes) = self.source.clone() else {
            return;
        };
        let at = self.clamp(at);

        if let Some(s) = self.sink.take() {
            s.stop();
        }

        match create_sink_at(&self.stream, &bytes, at, self.muted) {
            Ok(sink) => {
                if self.paused {
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
                self.accumulated = at;
            }
            Err(e) => {
                // The same bytes decoded at install time, so this is unexpected.
                error!(error = %e, "failed to rebuild sink");
                self.paused = true;
                self.started_at = None;
                self.accumulated = at;
            }
        }
        self.publish();
    }

    fn play(&mut self, at: Option<Duration>) {
        if self.source.is_none() {
            return;
        }

        match at {
            Some(at) => self.rebuild_at(at),
            None => {
                let exhausted = self.sink.as_ref().is_none_or(|s| s.empty());
                if exhausted {
                    let pos = self.position();
                    let restart = if self.duration.is_some_and(|d| pos >= d) {
                        Duration::ZERO
                    } else {
                        pos
                    };
                    self.rebuild_at(restart);
                }
            }
        }

        if !self.paused {
            return;
        }
        if let Some(ref s) = self.sink {
            s.play();
            self.paused = false;
            self.started_at = Some(Instant::now());
            self.publish();
            self.emit(EngineEvent::Started);
        }
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        if let Some(ref s) = self.sink {
            s.pause();
        }
        self.accumulated = self.position();
        self.started_at = None;
        self.paused = true;
        self.publish();
        self.emit(EngineEvent::Paused);
    }

    fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        if let Some(ref s) = self.sink {
            s.set_volume(volume_for(muted));
        }
        self.emit(EngineEvent::VolumeChanged { muted });
    }

    /// Periodic check: a playing sink that ran dry means the track ended.
    fn check_ended(&mut self) {
        if self.paused {
            return;
        }
        let Some(ref s) = self.sink else {
            return;
        };
        if !s.empty() {
            return;
        }

        self.accumulated = self.duration.unwrap_or_else(|| self.position());
        self.started_at = None;
        self.paused = true;
        self.publish();
        self.emit(EngineEvent::Ended);
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.take() {
            if !self.paused && !self.muted {
                // Fade out gently before stopping.
                fade_out_sink(&s, fade_out_ms);
            }
            s.stop();
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
