//! CLI-specific error types and mappings.
//!
//! Maps settings, speech, and IO failures to exit codes and user-facing
//! messages.

use readalong_core::SettingsError;
use readalong_speech::SpeechError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings file or override error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speech engine missing or refusing work.
    #[error("Speech error: {0}")]
    Speech(String),

    /// Playback ended in the error state.
    #[error("Playback failed: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Playback(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Speech(_) => 69,   // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        Self::Speech(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
