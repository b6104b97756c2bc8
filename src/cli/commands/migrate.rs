use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::{schema, DatabaseManager};

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool(&config.database).await?;
    schema::migrate(&pool).await?;
    pool.close().await;

    output_success(
        &output_format,
        "Schema is up to date",
        Some(json!({ "statements": schema::SCHEMA.len() })),
    )
}
