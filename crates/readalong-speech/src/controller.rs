//! Playback controller: owns the lifecycle of the one utterance submitted
//! to the speech engine and feeds engine progress to the highlight
//! synchronizer.
//!
//! The controller is a plain synchronous state machine. It never sleeps and
//! never spawns; operations that schedule work take the current time, and
//! [`PlaybackController::next_deadline`] tells the driver when to call
//! [`PlaybackController::tick`] next. [`crate::session`] provides that
//! driver on a tokio task.
//!
//! ```text
//! Idle ──play()──▶ Starting ──Started──▶ Speaking ──Finished──▶ Finished
//!                                          │  ▲
//!                                  pause() │  │ play()
//!                                          ▼  │
//!                                         Paused
//!
//! stop() from anywhere ──▶ Stopped      fatal engine error ──▶ Error(reason)
//! ```

use std::time::Duration;

use readalong_core::{
    PauseStrategy, PlatformCapabilities, PlaybackSettings, ProgressStrategy, Token, UtteranceId,
    UtteranceKind, UtteranceRequest, VoiceDescriptor, clamp_rate, tokenize,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::backend::{EngineErrorCode, EngineSignal, SignalKind, SpeechEngine};
use crate::debug::{DebugDetail, DebugRecorder, DebugSnapshot};
use crate::estimator::FallbackEstimator;
use crate::sync::{HighlightState, HighlightSynchronizer};

// ── State & events ─────────────────────────────────────────────────

/// Playback state, owned exclusively by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum PlaybackState {
    Idle,
    Starting,
    Speaking,
    Paused,
    Finished,
    Stopped,
    /// A fatal engine error. Recoverable through a fresh `play()`.
    Error(String),
}

impl PlaybackState {
    /// Short lowercase label for logs and the debug snapshot.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Speaking => "speaking",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Stopped => "stopped",
            Self::Error(_) => "error",
        }
    }

    /// Whether an utterance has been submitted and not yet ended or paused.
    pub const fn is_speaking(&self) -> bool {
        matches!(self, Self::Starting | Self::Speaking)
    }
}

/// Events emitted by the controller for the UI layer to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PlaybackEvent {
    /// Playback state changed.
    StateChanged { state: PlaybackState },

    /// The highlighted token changed. `None` clears the highlight.
    HighlightChanged { index: Option<usize> },

    /// The reading session played to its end.
    SessionFinished,
}

/// The retained handle of the utterance in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveUtterance {
    id: UtteranceId,
    kind: UtteranceKind,
}

// ── Controller ─────────────────────────────────────────────────────

/// Supervises one speech engine on behalf of one reading session.
pub struct PlaybackController {
    /// `None` when the host has no speech engine; every control op is then
    /// a no-op.
    engine: Option<Box<dyn SpeechEngine>>,

    /// Strategy selectors, resolved once.
    caps: PlatformCapabilities,

    settings: PlaybackSettings,

    voice: Option<VoiceDescriptor>,

    /// Text of the reading session.
    text: String,

    sync: HighlightSynchronizer,

    /// Running time estimate, constrained platforms only.
    estimator: Option<FallbackEstimator>,

    /// Set once the current utterance delivered a native boundary.
    boundary_seen: bool,

    state: PlaybackState,

    active: Option<ActiveUtterance>,

    last_id: UtteranceId,

    /// Pending resubmission after live reconfiguration.
    restart_due: Option<Instant>,

    /// Offset recorded when a constrained pause cancelled the utterance.
    paused_at_char: Option<usize>,

    debug: DebugRecorder,

    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller around `engine`.
    ///
    /// Returns the controller and a receiver for [`PlaybackEvent`]s.
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        caps: PlatformCapabilities,
        mut settings: PlaybackSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let engine = if engine.is_available() {
            tracing::debug!(backend = engine.id(), ?caps, "Speech engine ready");
            Some(engine)
        } else {
            tracing::warn!(
                backend = engine.id(),
                "Speech synthesis unavailable; playback controls are disabled"
            );
            None
        };
        settings.rate = clamp_rate(settings.rate);

        let controller = Self {
            engine,
            caps,
            settings,
            voice: None,
            text: String::new(),
            sync: HighlightSynchronizer::default(),
            estimator: None,
            boundary_seen: false,
            state: PlaybackState::Idle,
            active: None,
            last_id: UtteranceId::new(0),
            restart_due: None,
            paused_at_char: None,
            debug: DebugRecorder::default(),
            event_tx,
        };

        (controller, event_rx)
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Whether the host offers speech synthesis at all.
    pub const fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub const fn highlight(&self) -> HighlightState {
        self.sync.state()
    }

    /// The currently highlighted token.
    pub fn active_token(&self) -> Option<&Token> {
        self.sync.active_token()
    }

    pub fn tokens(&self) -> &[Token] {
        self.sync.tokens()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub const fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    pub const fn voice(&self) -> Option<&VoiceDescriptor> {
        self.voice.as_ref()
    }

    /// Id and kind of the utterance in flight.
    pub fn active_utterance(&self) -> Option<(UtteranceId, UtteranceKind)> {
        self.active.map(|a| (a.id, a.kind))
    }

    /// Char offset recorded by the last constrained-platform pause.
    pub const fn paused_at_char(&self) -> Option<usize> {
        self.paused_at_char
    }

    // ── Text binding ───────────────────────────────────────────────

    /// Tokenize `text` and bind it as the reading session text.
    pub fn load_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let tokens = tokenize(&text);
        self.bind(text, tokens);
    }

    /// Bind `text` with a caller-supplied token sequence.
    ///
    /// Cancels anything in flight and returns to `Idle`: the highlight can
    /// never point into the previous sequence.
    pub fn bind(&mut self, text: impl Into<String>, tokens: Vec<Token>) {
        if self.active.is_some() || self.restart_due.is_some() {
            self.cancel_engine();
        }
        self.clear_timers();
        self.paused_at_char = None;
        self.reset_highlight();

        self.text = text.into();
        self.sync.rebind(tokens);
        self.debug.clear();
        tracing::debug!(tokens = self.sync.tokens().len(), "Bound session text");
        self.set_state(PlaybackState::Idle);
    }

    // ── Control surface ────────────────────────────────────────────

    /// Start the reading session, or resume it when paused natively.
    pub fn play(&mut self) {
        if self.engine.is_none() {
            tracing::debug!("play() ignored: speech synthesis unavailable");
            return;
        }
        if self.text.trim().is_empty() {
            tracing::debug!("play() ignored: no text bound");
            return;
        }

        if self.state == PlaybackState::Paused
            && self.caps.pause == PauseStrategy::NativePauseResume
            && self.active.is_some()
        {
            if let Some(engine) = self.engine.as_mut() {
                engine.resume();
            }
            self.debug.record(DebugDetail::Resumed);
            self.set_state(PlaybackState::Speaking);
            return;
        }

        // Fresh submission from the top. On the constrained platform this is
        // also how a pause is resumed.
        self.cancel_engine();
        self.clear_timers();
        self.paused_at_char = None;
        self.reset_highlight();
        self.submit_session();
    }

    /// Pause the utterance being spoken.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Speaking {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match self.caps.pause {
            PauseStrategy::NativePauseResume => {
                engine.pause();
                self.debug.record(DebugDetail::Paused);
            }
            PauseStrategy::CancelAndRestartPauseResume => {
                self.paused_at_char = self.sync.state().last_matched_char_index;
                tracing::debug!(
                    char_index = ?self.paused_at_char,
                    "Constrained pause: cancelling utterance"
                );
                self.cancel_engine();
                self.debug.record(DebugDetail::PausedConstrained);
            }
        }

        self.estimator = None;
        self.set_state(PlaybackState::Paused);
    }

    /// Cancel everything and reset the highlight. Safe from any state.
    pub fn stop(&mut self) {
        if self.engine.is_none() {
            return;
        }
        self.cancel_engine();
        self.clear_timers();
        self.paused_at_char = None;
        self.reset_highlight();
        self.set_state(PlaybackState::Stopped);
    }

    /// Speak arbitrary text outside the reading session.
    pub fn speak(&mut self, text: &str) {
        self.speak_side_channel(text, self.settings.rate);
    }

    /// Pronounce one word, slowed down for intelligibility.
    pub fn speak_single_word(&mut self, word: &str) {
        self.speak_side_channel(word, self.settings.single_word_rate());
    }

    // ── Live reconfiguration ───────────────────────────────────────

    /// Change the reading rate. Restarts a speaking session.
    pub fn set_rate(&mut self, rate: f32, now: Instant) {
        let rate = clamp_rate(rate);
        if (rate - self.settings.rate).abs() < f32::EPSILON {
            return;
        }
        tracing::debug!(old = self.settings.rate, new = rate, "Rate changed");
        self.settings.rate = rate;
        self.restart_if_speaking(now);
    }

    /// Change the voice. Restarts a speaking session.
    pub fn set_voice(&mut self, voice: Option<VoiceDescriptor>, now: Instant) {
        if self.voice == voice {
            return;
        }
        tracing::debug!(
            old = self.voice.as_ref().map(|v| v.name.as_str()),
            new = voice.as_ref().map(|v| v.name.as_str()),
            "Voice changed"
        );
        self.settings.voice_name = voice.as_ref().map(|v| v.name.clone());
        self.voice = voice;
        self.restart_if_speaking(now);
    }

    // ── Driving ────────────────────────────────────────────────────

    /// When the driver should call [`tick`](Self::tick) next.
    ///
    /// Returns `now` while the applied highlight lags the estimate, so a
    /// step missed by a late driver is still applied. Estimation stops only
    /// once the highlight itself sits on the last token.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let count = self.sync.tokens().len();
        let applied = self.sync.active_index();
        let estimate = self
            .estimator
            .filter(|_| self.state == PlaybackState::Speaking)
            .filter(|_| applied != count.checked_sub(1))
            .map(|est| {
                let lagging = est
                    .index_at(now, count)
                    .is_some_and(|idx| applied.is_none_or(|a| idx > a));
                if lagging { now } else { est.next_tick(now) }
            });

        match (self.restart_due, estimate) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire whatever is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.restart_due.is_some_and(|due| now >= due) {
            self.restart_due = None;
            tracing::debug!("Settle delay elapsed; resubmitting session");
            self.submit_session();
        }

        if self.state != PlaybackState::Speaking {
            return;
        }
        let Some(estimate) = self
            .estimator
            .and_then(|est| est.index_at(now, self.sync.tokens().len()))
        else {
            return;
        };
        if self.sync.advance_to(estimate) {
            self.debug.record(DebugDetail::SpeakingEstimated);
            self.emit_highlight();
        }
    }

    /// Apply one engine signal.
    ///
    /// Signals tagged with anything but the utterance in flight are stale
    /// and dropped without touching state.
    pub fn handle_signal(&mut self, signal: EngineSignal, now: Instant) {
        let Some(active) = self.active.filter(|a| a.id == signal.utterance) else {
            tracing::trace!(
                utterance = %signal.utterance,
                kind = ?signal.kind,
                "Dropping stale engine signal"
            );
            return;
        };

        match signal.kind {
            SignalKind::Started => self.on_started(active, now),
            SignalKind::Boundary { char_index } => self.on_boundary(active, char_index),
            SignalKind::Finished => self.on_finished(active),
            SignalKind::Error(code) => self.on_error(active, &code),
        }
    }

    /// Diagnostic snapshot, if `debug_overlay` is enabled.
    pub fn debug_snapshot(&self) -> Option<DebugSnapshot> {
        if !self.settings.debug_overlay {
            return None;
        }
        Some(DebugSnapshot {
            playback_state: self.state.label().to_owned(),
            detail: self.debug.detail().map(|d| d.label().to_owned()),
            char_index: self.debug.char_index(),
            matched_token_text: self.debug.matched_token_text().map(str::to_owned),
            is_speaking: self.state.is_speaking(),
            total_tokens: self.sync.tokens().len(),
            voice_name: self.voice.as_ref().map(|v| v.name.clone()),
            is_local_voice: self.voice.as_ref().map(|v| v.local_service),
            last_event_time: self.debug.last_event_time(),
        })
    }

    // ── Signal handlers ────────────────────────────────────────────

    fn on_started(&mut self, active: ActiveUtterance, now: Instant) {
        if self.state == PlaybackState::Starting {
            self.set_state(PlaybackState::Speaking);
        }

        if active.kind == UtteranceKind::Session
            && self.caps.progress == ProgressStrategy::TimeEstimatedProgress
            && !self.boundary_seen
        {
            let estimator =
                FallbackEstimator::start(now, self.settings.ms_per_token, self.settings.rate);
            tracing::debug!(
                interval_ms = u64::try_from(estimator.interval().as_millis()).unwrap_or(u64::MAX),
                "Fallback estimator armed"
            );
            self.estimator = Some(estimator);
            if self.sync.advance_to(0) {
                self.debug.record(DebugDetail::SpeakingEstimated);
                self.emit_highlight();
            }
        }
    }

    fn on_boundary(&mut self, active: ActiveUtterance, char_index: usize) {
        if active.kind != UtteranceKind::Session {
            return;
        }

        if !self.boundary_seen {
            self.boundary_seen = true;
            if self.estimator.take().is_some() {
                tracing::debug!("Native boundary arrived; fallback estimator suppressed");
            }
        }

        let before = self.sync.active_index();
        let matched = self.sync.apply_offset(char_index);

        if self.settings.debug_overlay {
            let token = matched.and_then(|i| self.sync.tokens().get(i));
            let detail = match token {
                None => DebugDetail::SpeakingNoMatch,
                Some(t) if t.contains(char_index) => DebugDetail::SpeakingMatch,
                Some(_) => DebugDetail::SpeakingGap,
            };
            let text = token.map(|t| t.text.clone());
            self.debug
                .record_boundary(detail, char_index, text.as_deref());
        }

        if self.sync.active_index() != before {
            self.emit_highlight();
        }
    }

    fn on_finished(&mut self, active: ActiveUtterance) {
        self.active = None;
        self.estimator = None;

        match active.kind {
            UtteranceKind::Session => {
                self.reset_highlight();
                self.set_state(PlaybackState::Finished);
                self.emit(PlaybackEvent::SessionFinished);
            }
            UtteranceKind::SideChannel => self.set_state(PlaybackState::Idle),
        }
    }

    fn on_error(&mut self, active: ActiveUtterance, code: &EngineErrorCode) {
        if code.is_benign() {
            tracing::debug!(utterance = %active.id, %code, "Swallowing benign engine error");
            return;
        }

        tracing::warn!(utterance = %active.id, %code, "Speech engine error");
        self.active = None;
        self.clear_timers();
        self.set_state(PlaybackState::Error(code.to_string()));
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn speak_side_channel(&mut self, text: &str, rate: f32) {
        if self.engine.is_none() || text.trim().is_empty() {
            return;
        }
        self.cancel_engine();
        self.clear_timers();
        self.paused_at_char = None;
        self.submit(UtteranceKind::SideChannel, text.to_owned(), rate);
    }

    fn restart_if_speaking(&mut self, now: Instant) {
        let session_speaking = self.state == PlaybackState::Speaking
            && self
                .active
                .is_some_and(|a| a.kind == UtteranceKind::Session);
        if !session_speaking {
            return;
        }

        let settle = Duration::from_millis(self.settings.restart_settle_ms);
        tracing::debug!(
            settle_ms = self.settings.restart_settle_ms,
            "Restarting session after reconfiguration"
        );
        self.cancel_engine();
        self.estimator = None;
        self.reset_highlight();
        self.restart_due = Some(now + settle);
        self.set_state(PlaybackState::Starting);
    }

    fn submit_session(&mut self) {
        let text = self.text.clone();
        self.submit(UtteranceKind::Session, text, self.settings.rate);
    }

    /// Submit without cancelling. Callers cancel first.
    fn submit(&mut self, kind: UtteranceKind, text: String, rate: f32) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        self.last_id = self.last_id.next();
        let id = self.last_id;
        let request = UtteranceRequest::new(text, rate, self.voice.clone());
        self.boundary_seen = false;

        match engine.speak(id, &request) {
            Ok(()) => {
                tracing::debug!(utterance = %id, ?kind, rate, "Submitted utterance");
                self.active = Some(ActiveUtterance { id, kind });
                self.debug.record(DebugDetail::Starting);
                self.set_state(PlaybackState::Starting);
            }
            Err(e) => {
                tracing::warn!(utterance = %id, error = %e, "Speech engine refused utterance");
                self.active = None;
                self.set_state(PlaybackState::Error(e.to_string()));
            }
        }
    }

    /// Cancel at the engine and release the retained handle.
    fn cancel_engine(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel();
        }
        self.active = None;
    }

    fn clear_timers(&mut self) {
        self.estimator = None;
        self.restart_due = None;
    }

    fn reset_highlight(&mut self) {
        let had_highlight = self.sync.active_index().is_some();
        self.sync.reset();
        if had_highlight {
            self.emit_highlight();
        }
    }

    fn emit_highlight(&self) {
        self.emit(PlaybackEvent::HighlightChanged {
            index: self.sync.active_index(),
        });
    }

    /// Transition to a new state and emit a state-change event.
    fn set_state(&mut self, new_state: PlaybackState) {
        if self.state != new_state {
            tracing::debug!(old = ?self.state, new = ?new_state, "Playback state transition");
            self.state = new_state.clone();
            self.emit(PlaybackEvent::StateChanged { state: new_state });
        }
    }

    /// Emit a playback event (best-effort: a dropped receiver is logged).
    fn emit(&self, event: PlaybackEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Playback event receiver dropped");
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if self.active.is_some() {
            self.cancel_engine();
        }
    }
}
