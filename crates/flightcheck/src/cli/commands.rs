//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::ChecklistId;

/// Commands that read or change checklist state and settings.
#[derive(Debug, Subcommand)]
pub enum ChecklistCommand {
    /// Show progress of every checklist
    List(ListCommand),

    /// Open a checklist and show its items
    Show(ShowCommand),

    /// Check or uncheck one item
    Toggle(ToggleCommand),

    /// Uncheck every item of a checklist
    Reset(ResetCommand),

    /// Work with the most recently used checklist
    #[command(subcommand)]
    Current(CurrentCommand),

    /// Delete all checklist progress (settings are kept)
    Clear(ClearCommand),

    /// View or change preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// The checklist to open
    #[arg(value_enum)]
    pub checklist: ChecklistArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Toggle command arguments.
#[derive(Debug, Args)]
pub struct ToggleCommand {
    /// The checklist containing the item
    #[arg(value_enum)]
    pub checklist: ChecklistArg,

    /// Item number, starting at 1
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub item: u64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ToggleCommand {
    /// Zero-based item index.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.item.saturating_sub(1)).unwrap_or(usize::MAX)
    }
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// The checklist to reset
    #[arg(value_enum)]
    pub checklist: ChecklistArg,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Current checklist commands.
#[derive(Debug, Subcommand)]
pub enum CurrentCommand {
    /// Show the most recently used checklist
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Uncheck every item of the most recently used checklist
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Settings commands.
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show current preferences
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change preferences
    Set {
        /// Dark theme for cockpit use
        #[arg(long, value_name = "BOOL")]
        dark_mode: Option<bool>,

        /// Audible feedback when an item is checked
        #[arg(long, value_name = "BOOL")]
        sound: Option<bool>,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Checklist argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecklistArg {
    /// Pre-flight
    Prevol,
    /// Engine start
    Demarrage,
    /// Taxi
    Roulage,
    /// Runway entry
    #[value(name = "entreepiste")]
    EntreePiste,
    /// Takeoff
    Decollage,
    /// Approach
    Approche,
    /// Landing
    Atterrissage,
}

impl From<ChecklistArg> for ChecklistId {
    fn from(arg: ChecklistArg) -> Self {
        match arg {
            ChecklistArg::Prevol => Self::Prevol,
            ChecklistArg::Demarrage => Self::Demarrage,
            ChecklistArg::Roulage => Self::Roulage,
            ChecklistArg::EntreePiste => Self::EntreePiste,
            ChecklistArg::Decollage => Self::Decollage,
            ChecklistArg::Approche => Self::Approche,
            ChecklistArg::Atterrissage => Self::Atterrissage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_arg_names_match_identifiers() {
        for arg in ChecklistArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(ChecklistId::from(*arg).as_str(), name);
        }
    }

    #[test]
    fn test_checklist_arg_covers_catalog() {
        let ids: Vec<ChecklistId> = ChecklistArg::value_variants()
            .iter()
            .map(|arg| ChecklistId::from(*arg))
            .collect();
        assert_eq!(ids, ChecklistId::ALL.to_vec());
    }

    #[test]
    fn test_toggle_index_is_zero_based() {
        let cmd = ToggleCommand {
            checklist: ChecklistArg::Prevol,
            item: 1,
            json: false,
        };
        assert_eq!(cmd.index(), 0);
    }

    #[test]
    fn test_settings_command_debug() {
        let cmd = SettingsCommand::Set {
            dark_mode: Some(true),
            sound: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Set"));
        assert!(debug_str.contains("dark_mode"));
    }
}
