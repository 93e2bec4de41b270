//! Command-line interface for jotter.
//!
//! This module provides the CLI structure and output rendering for the
//! `jot` binary.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AddCommand, ConfigCommand, ListCommand, OutputFormat, StatusCommand};
pub use output::{render_record, render_records};

/// jot - Keep a running log of short messages
///
/// Each message is timestamped, appended to the log and kept in local
/// storage, so it is still there the next time you look.
#[derive(Debug, Parser)]
#[command(name = "jot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new message
    Add(AddCommand),

    /// Show recorded messages in the order they were added
    List(ListCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Whether the command needs the loaded configuration.
    ///
    /// `config path` and `config validate` must keep working when the
    /// default config file is broken.
    #[must_use]
    pub fn needs_config(&self) -> bool {
        !matches!(
            self.command,
            Command::Config(ConfigCommand::Path | ConfigCommand::Validate { .. })
        )
    }

    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
