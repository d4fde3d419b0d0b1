//! Core domain types.
//!
//! These types represent the pure domain model, independent of any speech
//! engine or host environment.
//!
//! # Structure
//!
//! - `token` - Word tokens with byte-offset spans, and the tokenizer
//! - `voice` - Voice descriptors and preferred-voice selection
//! - `utterance` - Utterance identity and the request submitted to an engine

mod token;
mod utterance;
mod voice;

pub use token::{Token, tokenize};
pub use utterance::{UtteranceId, UtteranceKind, UtteranceRequest};
pub use voice::{VoiceDescriptor, preferred_voice, rank_voices};
