use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::Command;

/// Keep redirect notes of a markdown vault tidy
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Vault folder (defaults to current directory)
    #[arg(long, default_value = ".")]
    pub vault: PathBuf,

    /// Increase logging verbosity (-v = info, -vv = debug, -vvv = trace).
    /// Default is warn level. Can also set RUST_LOG env var.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Report links to redirect-files and misplaced redirect-files
    Report,
    /// Move each redirect-file besides its target
    Move,
    /// Replace links to redirect-files with links to their targets
    Replace,
    /// Print each redirect-file with its target
    List,
}

impl Action {
    /// The vault command behind this action; `None` for `list`.
    pub fn command(&self) -> Option<Command> {
        match self {
            Action::Report => Some(Command::ReportRedirectFiles),
            Action::Move => Some(Command::MoveRedirectFilesBesidesTarget),
            Action::Replace => Some(Command::ReplaceLinksToRedirectFiles),
            Action::List => None,
        }
    }
}

impl Args {
    /// Get the log level filter string based on verbosity flags.
    /// Returns a filter suitable for tracing_subscriber::EnvFilter.
    pub fn log_level_filter(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        format!("{}={}", env!("CARGO_CRATE_NAME"), level)
    }
}
