//! Timer-driven speech engine.
//!
//! Plays an utterance by walking its words on the tokio clock: one
//! `Started`, one `Boundary` per word (unless boundaries are disabled to
//! mimic the constrained mobile engine), then `Finished`. Cancelling aborts
//! the walk and echoes a benign `Canceled` error for the aborted utterance,
//! the same way browser engines do.
//!
//! Used by the CLI and by the timing tests, where tokio's paused clock makes
//! every run deterministic.

use std::time::Duration;

use readalong_core::{UtteranceId, UtteranceRequest, VoiceDescriptor, tokenize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{EngineErrorCode, EngineSignal, SignalSender, SpeechEngine};
use crate::error::SpeechError;

/// Configuration for [`SimulatedEngine`].
#[derive(Debug, Clone)]
pub struct SimulatedEngineConfig {
    /// Whether the host "has" speech synthesis.
    pub available: bool,

    /// Time spent on one word at rate 1.0.
    pub word_duration: Duration,

    /// Delay between `speak` and the `Started` signal.
    pub startup_delay: Duration,

    /// Whether per-word boundary signals are emitted.
    pub emit_boundaries: bool,

    /// Whether `cancel` echoes a `Canceled` error for the aborted utterance.
    pub echo_cancel: bool,

    /// Fail every utterance with this code right after it starts.
    pub fail_with: Option<EngineErrorCode>,

    /// Voices reported by `list_voices`, in host order.
    pub voices: Vec<VoiceDescriptor>,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            available: true,
            word_duration: Duration::from_millis(250),
            startup_delay: Duration::from_millis(20),
            emit_boundaries: true,
            echo_cancel: true,
            fail_with: None,
            voices: default_voices(),
        }
    }
}

/// A small catalog resembling what desktop hosts report.
pub fn default_voices() -> Vec<VoiceDescriptor> {
    let mut aria = VoiceDescriptor::new("Microsoft Aria", "en-US", true);
    aria.is_default = true;
    vec![
        VoiceDescriptor::new("Google US English", "en-US", false),
        VoiceDescriptor::new("Daniel", "en-GB", true),
        aria,
        VoiceDescriptor::new("Thomas", "fr-FR", true),
        VoiceDescriptor::new("Google UK English Female", "en-GB", false),
    ]
}

/// The utterance currently being walked.
struct Playback {
    id: UtteranceId,
    task: JoinHandle<()>,
    paused: watch::Sender<bool>,
}

/// Timer-driven [`SpeechEngine`] implementation.
pub struct SimulatedEngine {
    config: SimulatedEngineConfig,
    signals: SignalSender,
    current: Option<Playback>,
}

impl SimulatedEngine {
    pub fn new(config: SimulatedEngineConfig, signals: SignalSender) -> Self {
        Self {
            config,
            signals,
            current: None,
        }
    }

    /// Id of the utterance being played, if any.
    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.current
            .as_ref()
            .filter(|p| !p.task.is_finished())
            .map(|p| p.id)
    }

    /// Abort the current walk without echoing anything.
    fn abort_current(&mut self) -> Option<UtteranceId> {
        let playback = self.current.take()?;
        let was_running = !playback.task.is_finished();
        playback.task.abort();
        was_running.then_some(playback.id)
    }
}

#[async_trait::async_trait]
impl SpeechEngine for SimulatedEngine {
    fn id(&self) -> &'static str {
        "simulated"
    }

    fn is_available(&self) -> bool {
        self.config.available
    }

    fn speak(&mut self, id: UtteranceId, request: &UtteranceRequest) -> Result<(), SpeechError> {
        if !self.config.available {
            return Err(SpeechError::Unavailable);
        }
        if let Some(voice) = &request.voice {
            if !self.config.voices.iter().any(|v| v.name == voice.name) {
                return Err(SpeechError::VoiceNotFound(voice.name.clone()));
            }
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Rejected(e.to_string()))?;

        // The engine holds one utterance at a time; a stray submission
        // replaces the current one silently.
        self.abort_current();

        let rate = if request.rate > 0.0 { request.rate } else { 1.0 };
        let walk = Walk {
            id,
            word_starts: tokenize(&request.text)
                .iter()
                .map(|t| t.start_index)
                .collect(),
            word_duration: self.config.word_duration.div_f32(rate),
            startup_delay: self.config.startup_delay,
            emit_boundaries: self.config.emit_boundaries,
            fail_with: self.config.fail_with.clone(),
            signals: self.signals.clone(),
        };

        let (paused_tx, paused_rx) = watch::channel(false);
        let task = runtime.spawn(walk.run(paused_rx));

        tracing::debug!(
            utterance = %id,
            rate,
            voice = request.voice.as_ref().map(|v| v.name.as_str()),
            "Simulated engine speaking"
        );

        self.current = Some(Playback {
            id,
            task,
            paused: paused_tx,
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(id) = self.abort_current() {
            tracing::debug!(utterance = %id, "Simulated engine cancelled");
            if self.config.echo_cancel {
                // Nobody listening is fine; the session may be shutting down.
                let _ = self
                    .signals
                    .send(EngineSignal::error(id, EngineErrorCode::Canceled));
            }
        }
    }

    fn pause(&mut self) {
        if let Some(playback) = &self.current {
            playback.paused.send_replace(true);
        }
    }

    fn resume(&mut self) {
        if let Some(playback) = &self.current {
            playback.paused.send_replace(false);
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechError> {
        if !self.config.available {
            return Err(SpeechError::Unavailable);
        }
        Ok(self.config.voices.clone())
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.abort_current();
    }
}

// ── Playback task ──────────────────────────────────────────────────

/// Everything the playback task needs, detached from the engine.
struct Walk {
    id: UtteranceId,
    word_starts: Vec<usize>,
    word_duration: Duration,
    startup_delay: Duration,
    emit_boundaries: bool,
    fail_with: Option<EngineErrorCode>,
    signals: SignalSender,
}

impl Walk {
    async fn run(self, mut paused: watch::Receiver<bool>) {
        tokio::time::sleep(self.startup_delay).await;
        if !wait_while_paused(&mut paused).await {
            return;
        }
        if !self.send(EngineSignal::started(self.id)) {
            return;
        }

        if let Some(code) = self.fail_with.clone() {
            self.send(EngineSignal::error(self.id, code));
            return;
        }

        for &start in &self.word_starts {
            if !wait_while_paused(&mut paused).await {
                return;
            }
            if self.emit_boundaries && !self.send(EngineSignal::boundary(self.id, start)) {
                return;
            }
            tokio::time::sleep(self.word_duration).await;
        }

        if wait_while_paused(&mut paused).await {
            self.send(EngineSignal::finished(self.id));
        }
    }

    fn send(&self, signal: EngineSignal) -> bool {
        self.signals.send(signal).is_ok()
    }
}

/// Block while the pause flag is set. Returns `false` if the engine went
/// away in the meantime.
async fn wait_while_paused(paused: &mut watch::Receiver<bool>) -> bool {
    while *paused.borrow_and_update() {
        if paused.changed().await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SignalKind, signal_channel};

    fn fast_config() -> SimulatedEngineConfig {
        SimulatedEngineConfig {
            word_duration: Duration::from_millis(100),
            startup_delay: Duration::from_millis(10),
            ..SimulatedEngineConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn walks_words_in_order() {
        let (tx, mut rx) = signal_channel();
        let mut engine = SimulatedEngine::new(fast_config(), tx);
        let id = UtteranceId::new(1);

        engine
            .speak(id, &UtteranceRequest::new("The cat sat.", 1.0, None))
            .unwrap();

        let mut kinds = Vec::new();
        while let Some(signal) = rx.recv().await {
            assert_eq!(signal.utterance, id);
            let done = signal.kind == SignalKind::Finished;
            kinds.push(signal.kind);
            if done {
                break;
            }
        }

        assert_eq!(
            kinds,
            vec![
                SignalKind::Started,
                SignalKind::Boundary { char_index: 0 },
                SignalKind::Boundary { char_index: 4 },
                SignalKind::Boundary { char_index: 8 },
                SignalKind::Finished,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_boundaries_when_disabled() {
        let (tx, mut rx) = signal_channel();
        let config = SimulatedEngineConfig {
            emit_boundaries: false,
            ..fast_config()
        };
        let mut engine = SimulatedEngine::new(config, tx);
        engine
            .speak(UtteranceId::new(1), &UtteranceRequest::new("a b", 1.0, None))
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::Started);
        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_echoes_benign_error() {
        let (tx, mut rx) = signal_channel();
        let mut engine = SimulatedEngine::new(fast_config(), tx);
        let id = UtteranceId::new(4);
        engine
            .speak(id, &UtteranceRequest::new("one two three", 1.0, None))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::Started);

        engine.cancel();
        let echo = rx.recv().await.unwrap();
        assert_eq!(echo, EngineSignal::error(id, EngineErrorCode::Canceled));
        assert!(engine.current_utterance().is_none());

        // Cancelling again is harmless and silent.
        engine.cancel();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_progress() {
        let (tx, mut rx) = signal_channel();
        let mut engine = SimulatedEngine::new(fast_config(), tx);
        engine
            .speak(UtteranceId::new(1), &UtteranceRequest::new("a b c", 1.0, None))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::Started);
        assert_eq!(
            rx.recv().await.unwrap().kind,
            SignalKind::Boundary { char_index: 0 }
        );

        engine.pause();
        tokio::time::sleep(Duration::from_secs(5)).await;
        // The word already in flight finishes its sleep, then the walk waits.
        assert!(rx.try_recv().is_err());

        engine.resume();
        assert_eq!(
            rx.recv().await.unwrap().kind,
            SignalKind::Boundary { char_index: 2 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn configured_failure_follows_start() {
        let (tx, mut rx) = signal_channel();
        let config = SimulatedEngineConfig {
            fail_with: Some(EngineErrorCode::AudioBusy),
            ..fast_config()
        };
        let mut engine = SimulatedEngine::new(config, tx);
        engine
            .speak(UtteranceId::new(1), &UtteranceRequest::new("a", 1.0, None))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::Started);
        assert_eq!(
            rx.recv().await.unwrap().kind,
            SignalKind::Error(EngineErrorCode::AudioBusy)
        );
    }

    #[test]
    fn unavailable_engine_rejects_everything() {
        let (tx, _rx) = signal_channel();
        let config = SimulatedEngineConfig {
            available: false,
            ..SimulatedEngineConfig::default()
        };
        let mut engine = SimulatedEngine::new(config, tx);
        assert!(!engine.is_available());
        assert!(matches!(
            engine.speak(UtteranceId::new(1), &UtteranceRequest::new("a", 1.0, None)),
            Err(SpeechError::Unavailable)
        ));
        assert!(matches!(
            tokio_test::block_on(engine.list_voices()),
            Err(SpeechError::Unavailable)
        ));
    }

    #[test]
    fn unknown_voice_is_rejected() {
        let (tx, _rx) = signal_channel();
        let mut engine = SimulatedEngine::new(SimulatedEngineConfig::default(), tx);
        let ghost = VoiceDescriptor::new("Ghost", "en-US", true);
        assert!(matches!(
            engine.speak(
                UtteranceId::new(1),
                &UtteranceRequest::new("a", 1.0, Some(ghost))
            ),
            Err(SpeechError::VoiceNotFound(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn lists_configured_voices() {
        let (tx, _rx) = signal_channel();
        let engine = SimulatedEngine::new(SimulatedEngineConfig::default(), tx);
        let voices = tokio_test::block_on(engine.list_voices()).unwrap();
        assert_eq!(voices, default_voices());
    }
}
