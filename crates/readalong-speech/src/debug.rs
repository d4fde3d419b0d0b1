//! Diagnostic snapshot of the synchronization pipeline.
//!
//! Only exposed when `debug_overlay` is set in [`PlaybackSettings`]. The
//! recorder is updated as signals arrive; the controller assembles a
//! [`DebugSnapshot`] on demand.
//!
//! [`PlaybackSettings`]: readalong_core::PlaybackSettings

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Timestamp format for `last_event_time` (UTC).
const EVENT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// What the pipeline was doing at the last recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebugDetail {
    Starting,
    /// Boundary offset fell inside a token.
    SpeakingMatch,
    /// Boundary offset fell between tokens; the sticky fallback matched.
    SpeakingGap,
    /// Boundary offset matched nothing.
    SpeakingNoMatch,
    /// Highlight driven by the time estimate.
    SpeakingEstimated,
    Paused,
    PausedConstrained,
    Resumed,
}

impl DebugDetail {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Starting => "Starting...",
            Self::SpeakingMatch => "Speaking (Match)",
            Self::SpeakingGap => "Speaking (Gap)",
            Self::SpeakingNoMatch => "Speaking (No Match)",
            Self::SpeakingEstimated => "Speaking (Estimated)",
            Self::Paused => "Paused",
            Self::PausedConstrained => "Paused (constrained)",
            Self::Resumed => "Resumed",
        }
    }
}

/// Point-in-time view for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub playback_state: String,
    pub detail: Option<String>,
    pub char_index: Option<usize>,
    pub matched_token_text: Option<String>,
    pub is_speaking: bool,
    pub total_tokens: usize,
    pub voice_name: Option<String>,
    pub is_local_voice: Option<bool>,
    pub last_event_time: Option<String>,
}

/// Rolling record of the last synchronization event.
#[derive(Debug, Clone, Default)]
pub struct DebugRecorder {
    detail: Option<DebugDetail>,
    char_index: Option<usize>,
    matched_token_text: Option<String>,
    last_event: Option<DateTime<Utc>>,
}

impl DebugRecorder {
    pub fn record(&mut self, detail: DebugDetail) {
        self.detail = Some(detail);
        self.last_event = Some(Utc::now());
    }

    pub fn record_boundary(
        &mut self,
        detail: DebugDetail,
        char_index: usize,
        matched: Option<&str>,
    ) {
        self.char_index = Some(char_index);
        self.matched_token_text = matched.map(str::to_owned);
        self.record(detail);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub const fn detail(&self) -> Option<DebugDetail> {
        self.detail
    }

    pub fn last_event_time(&self) -> Option<String> {
        self.last_event
            .map(|t| t.format(EVENT_TIME_FORMAT).to_string())
    }

    pub const fn char_index(&self) -> Option<usize> {
        self.char_index
    }

    pub fn matched_token_text(&self) -> Option<&str> {
        self.matched_token_text.as_deref()
    }
}
