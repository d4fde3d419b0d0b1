//! Core domain types and ports for readalong.
//!
//! This crate is pure: no async runtime, no speech engine. It defines the
//! token model and tokenizer, voice descriptors and ranking, utterance
//! identity, playback settings, and the platform capability probe consumed
//! by `readalong-speech`.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    Token, UtteranceId, UtteranceKind, UtteranceRequest, VoiceDescriptor, preferred_voice,
    rank_voices, tokenize,
};
pub use ports::{
    HostPlatformProbe, PauseStrategy, PlatformCapabilities, PlatformProbe, ProgressStrategy,
};
pub use settings::{
    DEFAULT_MS_PER_TOKEN, DEFAULT_RATE, DEFAULT_RESTART_SETTLE_MS, MAX_RATE, MIN_RATE,
    PlaybackSettings, SettingsError, clamp_rate, validate_settings,
};

// Dev-dependencies only used by integration tests
#[cfg(test)]
use tempfile as _;
