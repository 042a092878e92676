//! Engine error types.

/// Why a selected file could not become the active track.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("file is empty")]
    Empty,

    #[error("could not decode audio: {0}")]
    Decode(String),
}

/// Errors returned by engine commands.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A command arrived before any track finished loading.
    #[error("no track loaded")]
    NotReady,

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("audio thread is no longer running")]
    Disconnected,
}
