//! Validate a selected file and read its duration and tags.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use rodio::{Decoder, Source};

use super::error::LoadError;
use super::types::TrackInfo;

pub(super) struct Probed {
    pub duration: Option<Duration>,
    pub info: TrackInfo,
}

/// Check that rodio can decode `bytes`, then pull metadata with lofty.
///
/// Decodability is what makes a load succeed; tags and the lofty duration
/// are best effort and fall back to what the decoder reports.
pub(super) fn probe(bytes: &Arc<[u8]>) -> Result<Probed, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let decoder =
        Decoder::new(Cursor::new(bytes.clone())).map_err(|e| LoadError::Decode(e.to_string()))?;
    let mut duration = decoder.total_duration();
    let mut info = TrackInfo::default();

    let tagged = Probe::new(Cursor::new(bytes.clone()))
        .guess_file_type()
        .ok()
        .and_then(|p| p.read().ok());

    if let Some(tagged) = tagged {
        let d = tagged.properties().duration();
        if !d.is_zero() {
            duration = Some(d);
        }

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            info.title = tag
                .title()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            info.artist = tag
                .artist()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
    }

    Ok(Probed { duration, info })
}
