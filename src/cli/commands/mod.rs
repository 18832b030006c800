//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod client;
mod export;
mod fetch;
mod helpers;
mod init;
mod serve;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "boletin")]
#[command(about = "BOE daily bulletin ingestion and client document triage")]
#[command(version)]
pub struct Cli {
    /// Target directory or database file (overrides config file).
    /// Can be a directory containing boletin.db or a .db file directly.
    #[arg(long, short = 't', global = true, env = "BOLETIN_TARGET")]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Fetch one day of the bulletin and store new entries
    Fetch {
        /// Bulletin date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Start the web server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Export one day's documents as CSV
    Export {
        /// Bulletin date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage clients
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// Create a client for a user
    Add {
        /// Owning username
        owner: String,
        /// Client name
        name: String,
    },
    /// List a user's clients with document counts
    List {
        /// Owning username
        owner: String,
    },
    /// Rename a client
    Rename {
        /// Client ID
        id: i32,
        /// New name
        name: String,
    },
    /// Delete a client and its document priorities
    Remove {
        /// Client ID
        id: i32,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        target: cli.target,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Fetch { date } => fetch::cmd_fetch(&settings, date).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Export { date, output } => {
            export::cmd_export(&settings, date, output.as_deref()).await
        }
        Commands::Client { command } => match command {
            ClientCommands::Add { owner, name } => {
                client::cmd_client_add(&settings, &owner, &name).await
            }
            ClientCommands::List { owner } => client::cmd_client_list(&settings, &owner).await,
            ClientCommands::Rename { id, name } => {
                client::cmd_client_rename(&settings, id, &name).await
            }
            ClientCommands::Remove { id } => client::cmd_client_remove(&settings, id).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_date() {
        let cli = Cli::try_parse_from(["boletin", "fetch", "--date", "2024-01-10"]).unwrap();
        match cli.command {
            Commands::Fetch { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10));
            }
            _ => panic!("expected fetch"),
        }

        assert!(Cli::try_parse_from(["boletin", "fetch", "--date", "10/01/2024"]).is_err());
    }

    #[test]
    fn test_parse_client_remove() {
        let cli = Cli::try_parse_from(["boletin", "client", "remove", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Client {
                command: ClientCommands::Remove { id: 4 }
            }
        ));
        assert!(Cli::try_parse_from(["boletin", "client", "remove", "abc"]).is_err());
    }

    #[test]
    fn test_parse_global_target() {
        let cli = Cli::try_parse_from(["boletin", "client", "list", "ana", "-t", "/tmp/b.db"]).unwrap();
        assert_eq!(cli.target, Some(PathBuf::from("/tmp/b.db")));
        assert!(matches!(
            cli.command,
            Commands::Client {
                command: ClientCommands::List { .. }
            }
        ));
    }
}
