//! Drag-to-seek gesture handling.
//!
//! A drag session lives from pointer-down to pointer-up on the seek track.
//! While it is open only a preview position changes; the engine is touched
//! once, by whoever commits the value returned from `commit`.

/// Horizontal extent of the seek track in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRect {
    pub left: f64,
    pub width: f64,
}

/// Map a pointer x coordinate onto `[0, duration]`.
///
/// `seconds = (x - left) / width * duration`, clamped. Degenerate tracks
/// and durations map to 0.
pub fn pointer_to_seconds(pointer_x: f64, track: TrackRect, duration: f64) -> f64 {
    if !(track.width > 0.0) || !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    let ratio = (pointer_x - track.left) / track.width;
    if !ratio.is_finite() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0) * duration
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    anchor: TrackRect,
    duration: f64,
    preview: f64,
}

#[derive(Debug, Default)]
pub struct SeekController {
    session: Option<DragSession>,
}

impl SeekController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session anchored to `track` and return the initial preview.
    ///
    /// An already open session is replaced.
    pub fn begin(&mut self, pointer_x: f64, track: TrackRect, duration: f64) -> f64 {
        let preview = pointer_to_seconds(pointer_x, track, duration);
        self.session = Some(DragSession {
            anchor: track,
            duration,
            preview,
        });
        preview
    }

    /// Move the preview. Returns `None` when no session is open.
    pub fn update(&mut self, pointer_x: f64) -> Option<f64> {
        let session = self.session.as_mut()?;
        session.preview = pointer_to_seconds(pointer_x, session.anchor, session.duration);
        Some(session.preview)
    }

    /// Close the session and hand back the position to commit.
    pub fn commit(&mut self) -> Option<f64> {
        self.session.take().map(|s| s.preview)
    }

    /// Drop the session without committing.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn preview(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.preview)
    }
}
