//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Drive a playback session
//!   3. Format output for the terminal
//!
//! Handlers should NOT contain playback logic; that lives in
//! `readalong-speech`.

pub mod read;
pub mod say;
pub mod tokens;
pub mod voices;

use std::path::Path;

use crate::error::CliError;

/// Read a text file, rejecting files with nothing to read.
pub(crate) fn read_text(path: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    if text.trim().is_empty() {
        return Err(CliError::Arguments(format!(
            "{} contains no text",
            path.display()
        )));
    }
    Ok(text)
}
