//! Read command handler.
//!
//! Reads a text file aloud through a playback session and prints each word
//! as the highlight reaches it. Ctrl-C stops playback.

use std::path::PathBuf;

use anyhow::Result;
use readalong_core::{PlaybackSettings, clamp_rate, tokenize};
use readalong_speech::{PlaybackEvent, PlaybackState, SimulatedEngineConfig};

use super::read_text;
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::progress_line;

/// Arguments for the read command.
#[derive(Debug, Clone, Default)]
pub struct ReadArgs {
    pub file: PathBuf,
    pub rate: Option<f32>,
    pub voice: Option<String>,
    pub constrained: bool,
    pub no_boundaries: bool,
    pub debug: bool,
}

/// How a reading ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Finished,
    Stopped,
}

/// Execute the read command.
pub async fn execute(ctx: &CliContext, args: ReadArgs) -> Result<ReadOutcome> {
    let text = read_text(&args.file)?;
    let settings = apply_overrides(ctx.settings.clone(), &args)?;
    let engine = SimulatedEngineConfig {
        emit_boundaries: !args.no_boundaries,
        ..ctx.engine.clone()
    };

    let tokens = tokenize(&text);
    let mut session = ctx.start_session(settings, engine).await?;
    let handle = session.handle.clone();

    println!(
        "Reading {} ({} words, voice: {}, {})",
        args.file.display(),
        tokens.len(),
        session.voice.as_ref().map_or("default", |v| v.name.as_str()),
        if session.capabilities.is_constrained() {
            "constrained"
        } else {
            "native progress"
        }
    );

    handle.load_text(text)?;
    handle.play()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("Interrupted; stopping playback");
                handle.stop()?;
                break ReadOutcome::Stopped;
            }
            event = session.events.recv() => {
                match event {
                    Some(PlaybackEvent::HighlightChanged { index: Some(index) }) => {
                        if let Some(line) = progress_line(&tokens, index) {
                            println!("{line}");
                        }
                    }
                    Some(PlaybackEvent::SessionFinished) => break ReadOutcome::Finished,
                    Some(PlaybackEvent::StateChanged { state: PlaybackState::Error(reason) }) => {
                        return Err(CliError::Playback(reason).into());
                    }
                    Some(PlaybackEvent::StateChanged { state: PlaybackState::Stopped }) | None => {
                        break ReadOutcome::Stopped;
                    }
                    Some(_) => {}
                }
            }
        }
    };

    if args.debug {
        match handle.snapshot().await?.debug {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => println!("Debug overlay disabled."),
        }
    }

    handle.shutdown()?;
    handle.closed().await;

    if outcome == ReadOutcome::Stopped {
        println!("Stopped.");
    }
    Ok(outcome)
}

/// Fold command-line flags over the loaded settings.
fn apply_overrides(
    mut settings: PlaybackSettings,
    args: &ReadArgs,
) -> Result<PlaybackSettings, CliError> {
    if let Some(rate) = args.rate {
        if (clamp_rate(rate) - rate).abs() > f32::EPSILON {
            return Err(CliError::Arguments(format!(
                "--rate must be between 0.5 and 1.5, got {rate}"
            )));
        }
        settings.rate = rate;
    }
    if let Some(voice) = &args.voice {
        settings.voice_name = Some(voice.clone());
    }
    if args.constrained {
        settings.constrained_platform = Some(true);
    }
    if args.debug {
        settings.debug_overlay = true;
    }
    Ok(settings)
}
