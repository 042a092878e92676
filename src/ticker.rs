//! Per-frame position sampling while playback is running.
//!
//! The ticker owns at most one live registration. Each registration gets a
//! fresh `TickHandle`, so a sample taken under an old registration can be
//! recognized and dropped after the ticker was stopped or restarted.

/// Identifies one ticker registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

/// A position read taken during one display frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub handle: TickHandle,
    pub position: f64,
}

#[derive(Debug, Default)]
pub struct PositionTicker {
    active: Option<TickHandle>,
    generation: u64,
}

impl PositionTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin sampling. A running registration is cancelled first.
    pub fn start(&mut self) -> TickHandle {
        self.stop();
        self.generation += 1;
        let handle = TickHandle(self.generation);
        self.active = Some(handle);
        handle
    }

    /// Cancel the live registration. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    #[cfg(test)]
    pub fn handle(&self) -> Option<TickHandle> {
        self.active
    }

    pub fn is_live(&self, handle: TickHandle) -> bool {
        self.active == Some(handle)
    }

    /// Called once per display frame; reads the position only while running.
    pub fn frame(&self, read_position: impl FnOnce() -> f64) -> Option<TickSample> {
        let handle = self.active?;
        Some(TickSample {
            handle,
            position: read_position(),
        })
    }
}
