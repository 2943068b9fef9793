//! CLI module for the TeamSurvey service
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply the database schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// TeamSurvey - companies, teams and survey member provisioning
#[derive(Parser)]
#[command(name = "teamsurvey")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending schema migrations
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["teamsurvey", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["teamsurvey", "migrate"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate));

        assert!(Cli::try_parse_from(["teamsurvey", "ui"]).is_err());
    }
}
