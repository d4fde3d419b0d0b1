//! Voice descriptors and preferred-voice selection.

use serde::{Deserialize, Serialize};

/// Vendor voices that reliably emit boundary signals when run locally.
const PREFERRED_NAME_HINTS: [&str; 2] = ["Microsoft", "Samantha"];

/// A voice offered by the host speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Display name, also the selection key.
    pub name: String,

    /// BCP 47 language tag (e.g. `"en-US"`).
    pub lang: String,

    /// Whether synthesis runs on-device rather than over the network.
    pub local_service: bool,

    /// Whether the host marks this voice as its default.
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local_service: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local_service,
            is_default: false,
        }
    }

    /// Whether the voice speaks English.
    #[must_use]
    pub fn is_english(&self) -> bool {
        self.lang.starts_with("en")
    }
}

/// Keep English voices only, local voices first.
///
/// Remote voices often never fire boundary signals, so they sort last. The
/// sort is stable: the host's order is preserved within each group.
pub fn rank_voices(voices: impl IntoIterator<Item = VoiceDescriptor>) -> Vec<VoiceDescriptor> {
    let mut ranked: Vec<_> = voices.into_iter().filter(VoiceDescriptor::is_english).collect();
    ranked.sort_by_key(|v| !v.local_service);
    ranked
}

/// Pick the voice to use from an already ranked list.
///
/// Keeps `current` when it is still offered. Otherwise prefers a local
/// vendor voice, then the host default if local, then any local voice, then
/// the host default, then whatever comes first.
pub fn preferred_voice<'a>(
    ranked: &'a [VoiceDescriptor],
    current: Option<&str>,
) -> Option<&'a VoiceDescriptor> {
    if let Some(name) = current {
        if let Some(voice) = ranked.iter().find(|v| v.name == name) {
            return Some(voice);
        }
    }

    ranked
        .iter()
        .find(|v| v.local_service && PREFERRED_NAME_HINTS.iter().any(|h| v.name.contains(h)))
        .or_else(|| ranked.iter().find(|v| v.local_service && v.is_default))
        .or_else(|| ranked.iter().find(|v| v.local_service))
        .or_else(|| ranked.iter().find(|v| v.is_default))
        .or_else(|| ranked.first())
}
