//! Utterance identity and requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::VoiceDescriptor;

/// Identity tag of one submitted utterance.
///
/// Ids are issued in increasing order by a single controller. Signals carry
/// the id of the utterance they belong to, so signals from a superseded
/// utterance can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtteranceId(u64);

impl UtteranceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id issued after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Which surface submitted the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtteranceKind {
    /// The main reading session: drives highlighting and auto-restart.
    Session,

    /// One-shot `speak` / `speak_single_word`; never touches highlighting.
    SideChannel,
}

/// The unit of work submitted to a speech engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceRequest {
    pub text: String,
    pub rate: f32,
    pub voice: Option<VoiceDescriptor>,
}

impl UtteranceRequest {
    pub fn new(text: impl Into<String>, rate: f32, voice: Option<VoiceDescriptor>) -> Self {
        Self {
            text: text.into(),
            rate,
            voice,
        }
    }
}
