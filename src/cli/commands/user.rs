use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Add {
        #[arg(help = "Username (must match the token subject)")]
        username: String,
    },
}

pub async fn handle(
    cmd: UserCommands,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { username } => {
            let username = username.trim();
            if username.is_empty() {
                anyhow::bail!("username must not be empty");
            }

            let store = PgStore::new(DatabaseManager::pool(&config.database).await?);
            let user = store.create_user(username).await?;
            store.pool().close().await;

            output_success(
                &output_format,
                &format!("Created user '{}'", user.username),
                Some(json!({ "id": user.id, "username": user.username })),
            )
        }
    }
}
