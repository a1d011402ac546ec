//! CLI module for the mail relay
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: create the database schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Mail Relay - multi-tenant email sending with double opt-in verification
#[derive(Parser)]
#[command(name = "mail-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Create the database schema and exit
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["mail-relay", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Migrate)));

        let cli = Cli::try_parse_from(["mail-relay"]).unwrap();
        assert!(cli.command.is_none());
    }
}
