pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "todo - run and administer the to-do list API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long = "user", help = "Seed a user into the in-memory store (repeatable)")]
        users: Vec<String>,
    },

    #[command(about = "Apply the Postgres schema")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Issue a bearer token for a user")]
    Token {
        #[arg(help = "Username (token subject)")]
        username: String,
        #[arg(long, help = "Validity in hours (defaults to configuration)")]
        hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Serve { users } => commands::serve::handle(config, &users).await,
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, config, output_format).await,
        Commands::Token { username, hours } => {
            commands::token::handle(&username, hours, config, output_format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_token_command() {
        let cli = Cli::try_parse_from(["todo", "--json", "token", "admin", "--hours", "2"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Token { username, hours } => {
                assert_eq!(username, "admin");
                assert_eq!(hours, Some(2));
            }
            _ => panic!("expected token command"),
        }
    }

    #[test]
    fn parses_repeated_seed_users() {
        let cli = Cli::try_parse_from(["todo", "serve", "--user", "admin", "--user", "guest"]).unwrap();
        match cli.command {
            Commands::Serve { users } => assert_eq!(users, vec!["admin", "guest"]),
            _ => panic!("expected serve command"),
        }
    }
}
