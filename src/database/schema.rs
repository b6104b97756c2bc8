use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// Idempotent DDL, applied in order by `todo migrate`.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS todo_items (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(256) NOT NULL,
        is_completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_on TIMESTAMPTZ NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todo_items_user_id_idx ON todo_items (user_id)",
];

pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Applied {} schema statements", SCHEMA.len());
    Ok(())
}
