use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig};

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::TodoStore;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the store the server runs on.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a bounded Postgres pool from configuration.
    pub async fn pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let redacted = Self::redact(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", redacted);
        Ok(pool)
    }

    /// Postgres when `DATABASE_URL` is set, otherwise an in-memory store in
    /// development. `seed_users` are only applied to the in-memory store.
    pub async fn open_store(
        config: &AppConfig,
        seed_users: &[String],
    ) -> Result<Arc<dyn TodoStore>, DatabaseError> {
        if config.database.url.is_some() {
            let pool = Self::pool(&config.database).await?;
            if !seed_users.is_empty() {
                warn!("Ignoring seed users on Postgres; use `todo user add` instead");
            }
            return Ok(Arc::new(PgStore::new(pool)));
        }

        if !config.is_development() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
        let store = MemoryStore::new();
        for username in seed_users {
            store.add_user(username).await?;
            info!("Seeded user: {}", username);
        }
        Ok(Arc::new(store))
    }

    /// Connection string with the password masked, for logs.
    fn redact(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
