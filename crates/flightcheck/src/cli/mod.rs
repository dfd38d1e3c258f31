//! Command-line interface for flightcheck.
//!
//! This module provides the CLI structure for the `flightcheck` binary, which
//! stands in for the app screens: the checklist overview, a single checklist,
//! the current checklist and the settings page.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ChecklistArg, ChecklistCommand, ClearCommand, ConfigCommand, CurrentCommand, ListCommand,
    ResetCommand, SettingsCommand, ShowCommand, StatusCommand, ToggleCommand,
};

/// flightcheck - Aviation procedure checklists
///
/// Tick off pre-flight, start-up, taxi, takeoff, approach and landing
/// checklists; progress is saved locally between runs.
#[derive(Debug, Parser)]
#[command(name = "flightcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Keep state in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Checklist and settings commands
    #[command(flatten)]
    Checklist(ChecklistCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
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
