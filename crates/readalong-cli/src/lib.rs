//! `readalong` command-line adapter.
//!
//! Parses arguments, composes the speech stack in [`bootstrap`], and
//! dispatches to the command [`handlers`].
#![deny(unused_crate_dependencies)]

// Dependencies used only by the binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, SpeechSession, bootstrap, load_settings};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
