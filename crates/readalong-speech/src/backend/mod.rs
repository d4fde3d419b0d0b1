//! Speech engine backend trait: the engine-agnostic interface the
//! controller drives.
//!
//! Commands (`speak`, `cancel`, `pause`, `resume`) return immediately. Their
//! effects are reported later as [`EngineSignal`]s on the channel the engine
//! was built with (see [`signal_channel`]). Every signal carries the
//! [`UtteranceId`] it belongs to, which is how the controller tells the
//! current utterance apart from superseded ones.
//!
//! ## Backend implementations
//!
//! | Module          | Notes                                                  |
//! |-----------------|--------------------------------------------------------|
//! | [`simulated`]   | Timer-driven engine for the CLI and tests               |

pub mod simulated;

use std::fmt;
use std::str::FromStr;

use readalong_core::{UtteranceId, UtteranceRequest, VoiceDescriptor};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::SpeechError;

// ── Signals ────────────────────────────────────────────────────────

/// Sending half handed to an engine backend.
pub type SignalSender = mpsc::UnboundedSender<EngineSignal>;

/// Receiving half consumed by the playback session.
pub type SignalReceiver = mpsc::UnboundedReceiver<EngineSignal>;

/// Create the channel an engine reports its signals on.
#[must_use]
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}

/// One asynchronous notification from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSignal {
    /// The utterance this signal belongs to.
    pub utterance: UtteranceId,

    pub kind: SignalKind,
}

impl EngineSignal {
    pub const fn started(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: SignalKind::Started,
        }
    }

    pub const fn boundary(utterance: UtteranceId, char_index: usize) -> Self {
        Self {
            utterance,
            kind: SignalKind::Boundary { char_index },
        }
    }

    pub const fn finished(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: SignalKind::Finished,
        }
    }

    pub const fn error(utterance: UtteranceId, code: EngineErrorCode) -> Self {
        Self {
            utterance,
            kind: SignalKind::Error(code),
        }
    }
}

/// Lifecycle and progress signal shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// Audio output began.
    Started,

    /// The engine reached the word starting at `char_index` (byte offset
    /// into the utterance text).
    Boundary { char_index: usize },

    /// The utterance played to the end.
    Finished,

    /// The utterance failed or was cut off.
    Error(EngineErrorCode),
}

/// Engine error codes, named after the host speech API vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineErrorCode {
    Canceled,
    Interrupted,
    AudioBusy,
    AudioHardware,
    Network,
    SynthesisUnavailable,
    SynthesisFailed,
    LanguageUnavailable,
    VoiceUnavailable,
    TextTooLong,
    InvalidArgument,
    NotAllowed,
    /// A code this crate does not know.
    Other(String),
}

impl EngineErrorCode {
    /// Whether this is the expected echo of our own cancel/resubmit.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::Canceled | Self::Interrupted)
    }

    /// The host-facing code string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canceled => "canceled",
            Self::Interrupted => "interrupted",
            Self::AudioBusy => "audio-busy",
            Self::AudioHardware => "audio-hardware",
            Self::Network => "network",
            Self::SynthesisUnavailable => "synthesis-unavailable",
            Self::SynthesisFailed => "synthesis-failed",
            Self::LanguageUnavailable => "language-unavailable",
            Self::VoiceUnavailable => "voice-unavailable",
            Self::TextTooLong => "text-too-long",
            Self::InvalidArgument => "invalid-argument",
            Self::NotAllowed => "not-allowed",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "canceled" => Self::Canceled,
            "interrupted" => Self::Interrupted,
            "audio-busy" => Self::AudioBusy,
            "audio-hardware" => Self::AudioHardware,
            "network" => Self::Network,
            "synthesis-unavailable" => Self::SynthesisUnavailable,
            "synthesis-failed" => Self::SynthesisFailed,
            "language-unavailable" => Self::LanguageUnavailable,
            "voice-unavailable" => Self::VoiceUnavailable,
            "text-too-long" => Self::TextTooLong,
            "invalid-argument" => Self::InvalidArgument,
            "not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        })
    }
}

// ── Engine trait ───────────────────────────────────────────────────

/// Backend-agnostic text-to-speech engine.
///
/// The engine is a process-wide resource; the controller owning it assumes
/// exclusive use and always cancels before submitting, so an implementation
/// never has to queue a second utterance.
///
/// Implementations must be `Send + Sync` so a session can move them onto
/// its task and hold them across `.await` points.
#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Unique ID of the backend (e.g. `"simulated"`).
    fn id(&self) -> &'static str;

    /// Whether the host actually offers speech synthesis.
    fn is_available(&self) -> bool;

    /// Begin speaking `request`, tagging every resulting signal with `id`.
    fn speak(&mut self, id: UtteranceId, request: &UtteranceRequest) -> Result<(), SpeechError>;

    /// Abort whatever is speaking or paused. Harmless when idle.
    fn cancel(&mut self);

    /// Pause the current utterance in place.
    fn pause(&mut self);

    /// Continue a paused utterance.
    fn resume(&mut self);

    /// Voices the engine offers, in host order.
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancel_and_interrupt_are_benign() {
        assert!(EngineErrorCode::Canceled.is_benign());
        assert!(EngineErrorCode::Interrupted.is_benign());
        assert!(!EngineErrorCode::SynthesisFailed.is_benign());
        assert!(!EngineErrorCode::Other("canceled-ish".into()).is_benign());
    }

    #[test]
    fn codes_parse_from_host_strings() {
        assert_eq!(
            "audio-busy".parse::<EngineErrorCode>().unwrap(),
            EngineErrorCode::AudioBusy
        );
        assert_eq!(
            "weird".parse::<EngineErrorCode>().unwrap(),
            EngineErrorCode::Other("weird".into())
        );
        assert_eq!(EngineErrorCode::TextTooLong.to_string(), "text-too-long");
    }

    #[test]
    fn signal_constructors_tag_utterance() {
        let id = UtteranceId::new(3);
        assert_eq!(
            EngineSignal::boundary(id, 5).kind,
            SignalKind::Boundary { char_index: 5 }
        );
        assert_eq!(EngineSignal::finished(id).utterance, id);
    }
}
