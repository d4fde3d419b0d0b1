//! Speech engine error types.

/// Errors raised synchronously by a speech engine backend.
///
/// Asynchronous engine failures arrive as [`SignalKind::Error`] signals
/// instead and never surface through this type.
///
/// [`SignalKind::Error`]: crate::backend::SignalKind::Error
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The host has no speech engine.
    #[error("Speech synthesis is not available on this host")]
    Unavailable,

    /// The engine refused the utterance outright.
    #[error("Speech engine rejected the utterance: {0}")]
    Rejected(String),

    /// The requested voice is not offered by the engine.
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The playback session task is gone.
    #[error("Playback session has shut down")]
    SessionClosed,
}
