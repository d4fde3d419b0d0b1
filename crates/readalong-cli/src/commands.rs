//! Main commands enum.
//!
//! This module defines the available commands for the CLI tool.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the token sequence of a text file as JSON
    Tokens {
        /// Path to the text file
        file: PathBuf,
    },

    /// Read a text file aloud, highlighting each word as it is spoken
    Read {
        /// Path to the text file
        file: PathBuf,

        /// Reading rate multiplier (0.5 to 1.5)
        #[arg(short, long)]
        rate: Option<f32>,

        /// Name of the voice to use
        #[arg(long)]
        voice: Option<String>,

        /// Use the constrained-platform code paths (cancel-and-restart pause,
        /// time-estimated progress)
        #[arg(long)]
        constrained: bool,

        /// Make the engine withhold word boundary signals
        #[arg(long)]
        no_boundaries: bool,

        /// Print the diagnostic snapshot when playback ends
        #[arg(long)]
        debug: bool,
    },

    /// Speak arbitrary text outside of a reading session
    Say {
        /// Text to speak
        text: String,

        /// Pronounce a single word at the slowed single-word rate
        #[arg(long)]
        single_word: bool,

        /// Name of the voice to use
        #[arg(long)]
        voice: Option<String>,
    },

    /// List available English voices, preferred voice first
    Voices,
}
