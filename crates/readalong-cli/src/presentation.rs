//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no playback logic.

use readalong_core::{Token, VoiceDescriptor};

/// Truncates a string to a maximum number of characters, adding "..." if
/// needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// One progress line for the highlighted token, e.g. `[ 2/3] cat`.
pub fn progress_line(tokens: &[Token], index: usize) -> Option<String> {
    let token = tokens.get(index)?;
    let width = tokens.len().to_string().len();
    Some(format!(
        "[{:>width$}/{}] {}",
        index + 1,
        tokens.len(),
        token.text
    ))
}

/// One row of the voice table.
pub fn voice_row(voice: &VoiceDescriptor, preferred: bool) -> String {
    format!(
        "{} {:<32} {:<8} {}",
        if preferred { "*" } else { " " },
        truncate_string(&voice.name, 32),
        voice.lang,
        if voice.local_service { "local" } else { "remote" }
    )
}
