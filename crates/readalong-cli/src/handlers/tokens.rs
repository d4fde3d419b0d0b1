//! Tokens command handler.
//!
//! Prints the token sequence of a text file as pretty JSON.

use std::path::Path;

use anyhow::Result;
use readalong_core::tokenize;

use super::read_text;

/// Execute the tokens command.
pub fn execute(file: &Path) -> Result<()> {
    let text = read_text(file)?;
    let tokens = tokenize(&text);
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}
