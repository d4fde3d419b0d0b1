//! Say command handler.
//!
//! Speaks arbitrary text as a side-channel utterance and waits for it to
//! finish.

use anyhow::Result;
use readalong_speech::{PlaybackEvent, PlaybackState};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the say command.
#[derive(Debug, Clone, Default)]
pub struct SayArgs {
    pub text: String,
    pub single_word: bool,
    pub voice: Option<String>,
}

/// Execute the say command.
pub async fn execute(ctx: &CliContext, args: SayArgs) -> Result<()> {
    let text = args.text.trim();
    if text.is_empty() {
        return Err(CliError::Arguments("nothing to say".to_string()).into());
    }
    if args.single_word && text.split_whitespace().nth(1).is_some() {
        return Err(CliError::Arguments(format!(
            "--single-word expects one word, got {text:?}"
        ))
        .into());
    }

    let mut settings = ctx.settings.clone();
    if let Some(voice) = &args.voice {
        settings.voice_name = Some(voice.clone());
    }
    let rate = if args.single_word {
        settings.single_word_rate()
    } else {
        settings.rate
    };

    let mut session = ctx.start_session(settings, ctx.engine.clone()).await?;
    let handle = session.handle.clone();

    if args.single_word {
        handle.speak_single_word(text)?;
    } else {
        handle.speak(text)?;
    }
    println!(
        "Speaking {text:?} at {rate:.2}x ({})",
        session.voice.as_ref().map_or("default", |v| v.name.as_str())
    );

    let mut started = false;
    while let Some(event) = session.events.recv().await {
        match event {
            PlaybackEvent::StateChanged {
                state: PlaybackState::Speaking,
            } => started = true,
            PlaybackEvent::StateChanged {
                state: PlaybackState::Idle,
            } if started => break,
            PlaybackEvent::StateChanged {
                state: PlaybackState::Error(reason),
            } => return Err(CliError::Playback(reason).into()),
            _ => {}
        }
    }

    handle.shutdown()?;
    handle.closed().await;
    Ok(())
}
