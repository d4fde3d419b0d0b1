//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for reading text aloud with word highlighting.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "readalong")]
#[command(about = "Read text aloud and follow along word by word")]
#[command(version)]
pub struct Cli {
    /// JSON file with playback settings
    #[arg(long = "settings", global = true, env = "READALONG_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
