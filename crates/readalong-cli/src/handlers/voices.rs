//! Voices command handler.
//!
//! Lists English voices in ranked order and marks the one a session would
//! pick.

use anyhow::Result;
use readalong_core::preferred_voice;

use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, voice_row};

/// Execute the voices command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let voices = ctx.voices().await?;

    if voices.is_empty() {
        println!("No English voices available.");
        return Ok(());
    }

    let preferred = preferred_voice(&voices, ctx.settings.voice_name.as_deref());

    println!("{:<1} {:<32} {:<8} Execution", "", "Name", "Lang");
    print_separator(56);
    for voice in &voices {
        println!("{}", voice_row(voice, preferred == Some(voice)));
    }
    Ok(())
}
