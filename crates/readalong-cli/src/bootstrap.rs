//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the speech stack is wired together
//! for the CLI adapter: settings are loaded and validated, the platform
//! probe is resolved into capabilities, and a simulated engine is placed
//! behind a playback session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use readalong_core::{
    HostPlatformProbe, PlatformCapabilities, PlatformProbe, PlaybackSettings, VoiceDescriptor,
    preferred_voice, rank_voices, validate_settings,
};
use readalong_speech::{
    PlaybackController, PlaybackEvent, PlaybackSession, SessionHandle, SimulatedEngine,
    SimulatedEngineConfig, SpeechEngine, SpeechError, signal_channel,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Optional JSON settings file.
    pub settings_path: Option<PathBuf>,
    /// Engine behaviour shared by every command.
    pub engine: SimulatedEngineConfig,
}

impl CliConfig {
    /// Create config with default engine behaviour.
    pub fn with_settings_path(settings_path: Option<PathBuf>) -> Self {
        Self {
            settings_path,
            engine: SimulatedEngineConfig::default(),
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Validated settings from the settings file (or defaults).
    pub settings: PlaybackSettings,
    /// Engine configuration handed to every session.
    pub engine: SimulatedEngineConfig,
    probe: Arc<dyn PlatformProbe>,
}

/// A running playback session plus its event stream.
pub struct SpeechSession {
    pub handle: SessionHandle,
    pub events: mpsc::UnboundedReceiver<PlaybackEvent>,
    pub voice: Option<VoiceDescriptor>,
    pub capabilities: PlatformCapabilities,
}

/// Compose the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings = load_settings(config.settings_path.as_deref())?;
    Ok(CliContext {
        settings,
        engine: config.engine,
        probe: Arc::new(HostPlatformProbe),
    })
}

/// Load settings from a JSON file, or defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<PlaybackSettings, CliError> {
    let Some(path) = path else {
        return Ok(PlaybackSettings::default());
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let settings: PlaybackSettings = serde_json::from_str(&raw)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    validate_settings(&settings)?;

    tracing::debug!(path = %path.display(), "Loaded playback settings");
    Ok(settings)
}

impl CliContext {
    /// Replace the platform probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn PlatformProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Ranked English voices offered by the engine.
    pub async fn voices(&self) -> Result<Vec<VoiceDescriptor>, CliError> {
        let (signal_tx, _signal_rx) = signal_channel();
        let engine = SimulatedEngine::new(self.engine.clone(), signal_tx);
        Ok(rank_voices(engine.list_voices().await?))
    }

    /// Build a controller for `settings` and spawn its session.
    pub async fn start_session(
        &self,
        settings: PlaybackSettings,
        engine: SimulatedEngineConfig,
    ) -> Result<SpeechSession, CliError> {
        validate_settings(&settings)?;
        let capabilities =
            PlatformCapabilities::resolve(self.probe.as_ref(), settings.constrained_platform);

        let (signal_tx, signal_rx) = signal_channel();
        let engine = SimulatedEngine::new(engine, signal_tx);
        if !engine.is_available() {
            return Err(SpeechError::Unavailable.into());
        }

        let ranked = rank_voices(engine.list_voices().await?);
        let voice = resolve_voice(&ranked, settings.voice_name.as_deref());

        let (mut controller, events) =
            PlaybackController::new(Box::new(engine), capabilities, settings);
        controller.set_voice(voice.clone(), Instant::now());

        Ok(SpeechSession {
            handle: PlaybackSession::spawn(controller, signal_rx),
            events,
            voice,
            capabilities,
        })
    }
}

/// Pick the session voice, warning when the requested one is not offered.
fn resolve_voice(ranked: &[VoiceDescriptor], requested: Option<&str>) -> Option<VoiceDescriptor> {
    if let Some(name) = requested {
        if !ranked.iter().any(|v| v.name == name) {
            tracing::warn!(voice = name, "Requested voice not offered; using preferred voice");
        }
    }
    preferred_voice(ranked, requested).cloned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(load_settings(None).unwrap(), PlaybackSettings::default());
    }

    #[test]
    fn settings_file_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rate": 1.25, "voiceName": "Daniel"}}"#).unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert!((settings.rate - 1.25).abs() < f32::EPSILON);
        assert_eq!(settings.voice_name.as_deref(), Some("Daniel"));
    }

    #[test]
    fn invalid_settings_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rate": 9.0}}"#).unwrap();
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(CliError::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn unreadable_settings_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            load_settings(Some(&missing)),
            Err(CliError::Io(_))
        ));
    }

    #[test]
    fn unknown_voice_falls_back_to_preferred() {
        let ranked = rank_voices(readalong_speech::backend::simulated::default_voices());
        let voice = resolve_voice(&ranked, Some("Nobody")).unwrap();
        assert_eq!(voice.name, "Microsoft Aria");

        let voice = resolve_voice(&ranked, Some("Daniel")).unwrap();
        assert_eq!(voice.name, "Daniel");
    }

    #[test]
    fn voices_are_ranked() {
        let ctx = bootstrap(CliConfig::default()).unwrap();
        let voices = tokio_test::block_on(ctx.voices()).unwrap();
        assert!(voices.iter().all(VoiceDescriptor::is_english));
        assert!(voices[0].local_service);
    }
}
