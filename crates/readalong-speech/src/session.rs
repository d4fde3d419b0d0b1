//! Async driver for a [`PlaybackController`].
//!
//! The session owns the controller on a single tokio task and multiplexes
//! three inputs:
//!
//! 1. **Commands** from any number of [`SessionHandle`]s.
//! 2. **Engine signals** from the backend's signal channel.
//! 3. **Deadlines** reported by [`PlaybackController::next_deadline`]
//!    (settle-delay restarts and fallback estimator ticks).
//!
//! Handles never block: every control call is a channel send. Dropping the
//! last handle shuts the session down and cancels the engine.

use readalong_core::{Token, VoiceDescriptor};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use crate::backend::SignalReceiver;
use crate::controller::{PlaybackController, PlaybackState};
use crate::debug::DebugSnapshot;
use crate::error::SpeechError;
use crate::sync::HighlightState;

/// A command sent from a handle to the session task.
#[derive(Debug)]
enum Command {
    Play,
    Pause,
    Stop,
    Speak(String),
    SpeakSingleWord(String),
    SetRate(f32),
    SetVoice(Option<VoiceDescriptor>),
    LoadText(String),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Point-in-time view of the session, answered by the session task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub highlight: HighlightState,
    pub active_token: Option<Token>,
    pub total_tokens: usize,
    /// Present only when the debug overlay is enabled.
    pub debug: Option<DebugSnapshot>,
}

impl SessionSnapshot {
    fn capture(controller: &PlaybackController) -> Self {
        Self {
            state: controller.state().clone(),
            highlight: controller.highlight(),
            active_token: controller.active_token().cloned(),
            total_tokens: controller.tokens().len(),
            debug: controller.debug_snapshot(),
        }
    }
}

/// Spawner for the session task.
pub struct PlaybackSession;

impl PlaybackSession {
    /// Move `controller` onto a new task fed by `signals`.
    ///
    /// `signals` must be the receiving half of the channel the controller's
    /// engine was built with. Must be called from within a tokio runtime.
    pub fn spawn(controller: PlaybackController, signals: SignalReceiver) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(controller, rx, signals));
        SessionHandle { tx }
    }
}

/// Cloneable control surface of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub fn play(&self) -> Result<(), SpeechError> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<(), SpeechError> {
        self.send(Command::Pause)
    }

    pub fn stop(&self) -> Result<(), SpeechError> {
        self.send(Command::Stop)
    }

    pub fn speak(&self, text: impl Into<String>) -> Result<(), SpeechError> {
        self.send(Command::Speak(text.into()))
    }

    pub fn speak_single_word(&self, word: impl Into<String>) -> Result<(), SpeechError> {
        self.send(Command::SpeakSingleWord(word.into()))
    }

    pub fn set_rate(&self, rate: f32) -> Result<(), SpeechError> {
        self.send(Command::SetRate(rate))
    }

    pub fn set_voice(&self, voice: Option<VoiceDescriptor>) -> Result<(), SpeechError> {
        self.send(Command::SetVoice(voice))
    }

    pub fn load_text(&self, text: impl Into<String>) -> Result<(), SpeechError> {
        self.send(Command::LoadText(text.into()))
    }

    /// Ask the session for a snapshot of its current state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SpeechError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| SpeechError::SessionClosed)
    }

    /// Stop playback and end the session task.
    pub fn shutdown(&self) -> Result<(), SpeechError> {
        self.send(Command::Shutdown)
    }

    /// Resolves once the session task has exited.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), SpeechError> {
        self.tx.send(command).map_err(|_| SpeechError::SessionClosed)
    }
}

// ── Event loop ─────────────────────────────────────────────────────

async fn run(
    mut controller: PlaybackController,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut signals: SignalReceiver,
) {
    tracing::debug!("Playback session started");

    loop {
        // Commands win the biased race, so apply anything already due
        // before picking the next wakeup.
        let now = Instant::now();
        controller.tick(now);
        let deadline = controller.next_deadline(now);

        tokio::select! {
            biased;

            command = commands.recv() => {
                match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => apply(&mut controller, command),
                }
            }

            Some(signal) = signals.recv() => {
                controller.handle_signal(signal, Instant::now());
            }

            () = wait_for(deadline) => {
                controller.tick(Instant::now());
            }
        }
    }

    controller.stop();
    tracing::debug!("Playback session stopped");
}

fn apply(controller: &mut PlaybackController, command: Command) {
    match command {
        Command::Play => controller.play(),
        Command::Pause => controller.pause(),
        Command::Stop => controller.stop(),
        Command::Speak(text) => controller.speak(&text),
        Command::SpeakSingleWord(word) => controller.speak_single_word(&word),
        Command::SetRate(rate) => controller.set_rate(rate, Instant::now()),
        Command::SetVoice(voice) => controller.set_voice(voice, Instant::now()),
        Command::LoadText(text) => controller.load_text(text),
        Command::Snapshot(reply) => {
            // The asker may have given up; that's fine.
            let _ = reply.send(SessionSnapshot::capture(controller));
        }
        Command::Shutdown => {}
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
