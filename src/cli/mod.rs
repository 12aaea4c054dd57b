//! Command-line interface definitions using clap

pub mod commands;

use std::fmt;

use clap::{Parser, Subcommand};

/// kvlinker - a key/value link service with a password-gated command API
#[derive(Parser, Debug)]
#[command(name = "kvlinker")]
#[command(version)]
#[command(about = "Key/value link shortener and redirect service", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Manage the admin password stored in the key/value store
    Password {
        #[command(subcommand)]
        action: PasswordCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PasswordCommands {
    /// Set the admin password
    Set {
        /// New password (omit together with --stdin to read it from stdin)
        value: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// Remove the admin password
    Clear,

    /// Show whether an admin password is configured
    Show,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Force overwrite of an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::KvLinkError> for CliError {
    fn from(err: crate::errors::KvLinkError) -> Self {
        CliError::StorageError(err.message())
    }
}

impl From<crate::storage::StorageError> for CliError {
    fn from(err: crate::storage::StorageError) -> Self {
        CliError::StorageError(err.to_string())
    }
}
