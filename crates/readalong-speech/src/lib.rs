//! Speech playback and word-highlight synchronization.
//!
//! [`PlaybackController`] drives one [`SpeechEngine`] utterance at a time
//! and maps the engine's asynchronous progress onto the bound token
//! sequence through the [`HighlightSynchronizer`]. On platforms whose
//! engine never reports word boundaries, a [`FallbackEstimator`] advances
//! the highlight from elapsed time instead.
//!
//! [`PlaybackSession`] runs a controller on a tokio task and hands out
//! cloneable [`SessionHandle`]s.
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod controller;
pub mod debug;
pub mod error;
pub mod estimator;
pub mod session;
pub mod sync;

// Re-export key types for convenience
pub use backend::simulated::{SimulatedEngine, SimulatedEngineConfig};
pub use backend::{
    EngineErrorCode, EngineSignal, SignalKind, SignalReceiver, SignalSender, SpeechEngine,
    signal_channel,
};
pub use controller::{PlaybackController, PlaybackEvent, PlaybackState};
pub use debug::DebugSnapshot;
pub use error::SpeechError;
pub use estimator::FallbackEstimator;
pub use session::{PlaybackSession, SessionHandle, SessionSnapshot};
pub use sync::{HighlightState, HighlightSynchronizer, match_token};

// Dev-dependencies only used by integration tests
#[cfg(test)]
use mockall as _;
