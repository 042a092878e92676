//! Build `rodio` sinks over an in-memory source.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::error::LoadError;

pub(super) fn volume_for(muted: bool) -> f32 {
    if muted { 0.0 } else { 1.0 }
}

/// Create a paused `Sink` over `bytes` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    start_at: Duration,
    muted: bool,
) -> Result<Sink, LoadError> {
    let source = Decoder::new(Cursor::new(bytes.clone()))
        .map_err(|e| LoadError::Decode(e.to_string()))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume_for(muted));
    sink.append(source);
    sink.pause();
    Ok(sink)
}
