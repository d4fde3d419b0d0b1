//! Playback settings and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The CLI
//! loads them from JSON and flag overrides; embedders construct them directly.

use serde::{Deserialize, Serialize};

/// Slowest accepted reading rate.
pub const MIN_RATE: f32 = 0.5;

/// Fastest accepted reading rate.
pub const MAX_RATE: f32 = 1.5;

/// Default reading rate multiplier.
pub const DEFAULT_RATE: f32 = 1.0;

/// Fallback estimator baseline: milliseconds per token at 1.0x.
pub const DEFAULT_MS_PER_TOKEN: u64 = 150;

/// Delay between cancel and resubmit when the session restarts.
pub const DEFAULT_RESTART_SETTLE_MS: u64 = 50;

/// Settings consumed by the playback controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackSettings {
    /// Rate multiplier for the reading session (0.5–1.5).
    pub rate: f32,

    /// Name of the preferred voice, if any.
    pub voice_name: Option<String>,

    /// Fallback estimator baseline at 1.0x.
    pub ms_per_token: u64,

    /// Lowest rate a single-word pronunciation may use.
    pub single_word_rate_floor: f32,

    /// Factor applied to the session rate for single-word pronunciation.
    pub single_word_rate_scale: f32,

    /// Settle delay between cancel and resubmit on live reconfiguration.
    pub restart_settle_ms: u64,

    /// Expose the debug snapshot.
    pub debug_overlay: bool,

    /// Force the constrained-platform code paths on or off.
    /// `None` defers to the platform probe.
    pub constrained_platform: Option<bool>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            voice_name: None,
            ms_per_token: DEFAULT_MS_PER_TOKEN,
            single_word_rate_floor: 0.6,
            single_word_rate_scale: 0.8,
            restart_settle_ms: DEFAULT_RESTART_SETTLE_MS,
            debug_overlay: false,
            constrained_platform: None,
        }
    }
}

impl PlaybackSettings {
    /// Rate for a single-word utterance: scaled down from the session rate
    /// but never below the floor.
    #[must_use]
    pub fn single_word_rate(&self) -> f32 {
        (self.rate * self.single_word_rate_scale).max(self.single_word_rate_floor)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Rate must be between 0.5 and 1.5, got {0}")]
    InvalidRate(f32),

    #[error("Milliseconds per token must be greater than 0")]
    InvalidMsPerToken,

    #[error("Single-word rate floor must be between 0.5 and 1.5, got {0}")]
    InvalidSingleWordFloor(f32),

    #[error("Single-word rate scale must be in (0, 1], got {0}")]
    InvalidSingleWordScale(f32),

    #[error("Voice name cannot be empty")]
    EmptyVoiceName,
}

/// Validate settings values.
pub fn validate_settings(settings: &PlaybackSettings) -> Result<(), SettingsError> {
    if !(MIN_RATE..=MAX_RATE).contains(&settings.rate) {
        return Err(SettingsError::InvalidRate(settings.rate));
    }

    if settings.ms_per_token == 0 {
        return Err(SettingsError::InvalidMsPerToken);
    }

    if !(MIN_RATE..=MAX_RATE).contains(&settings.single_word_rate_floor) {
        return Err(SettingsError::InvalidSingleWordFloor(
            settings.single_word_rate_floor,
        ));
    }

    let scale = settings.single_word_rate_scale;
    if !(scale > 0.0 && scale <= 1.0) {
        return Err(SettingsError::InvalidSingleWordScale(scale));
    }

    if let Some(ref name) = settings.voice_name {
        if name.trim().is_empty() {
            return Err(SettingsError::EmptyVoiceName);
        }
    }

    Ok(())
}

/// Clamp a caller-supplied rate into the accepted range.
///
/// NaN maps to the default rate.
#[must_use]
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        DEFAULT_RATE
    } else {
        rate.clamp(MIN_RATE, MAX_RATE)
    }
}
