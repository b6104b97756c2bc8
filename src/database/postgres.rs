use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::manager::DatabaseError;
use super::models::{NewTodoItem, TodoItem, User};
use super::store::{StoreSession, TodoStore};

const ITEM_COLUMNS: &str = "t.id, t.title, t.is_completed, t.created_on, t.user_id";

/// Postgres-backed store; one `sqlx` transaction per session.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert an account. Accounts are managed outside the HTTP API.
    pub async fn create_user(&self, username: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Integrity(format!("user '{}' already exists", username))
            }
            other => DatabaseError::Sqlx(other),
        })?;
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        // One snapshot for every statement in the session (list and count must agree)
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgSession { tx }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn find_user(&mut self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_item(&mut self, owner: &str, id: i64) -> Result<Option<TodoItem>, DatabaseError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM todo_items t \
             JOIN users u ON u.id = t.user_id \
             WHERE u.username = $1 AND t.id = $2"
        );
        let item = sqlx::query_as::<_, TodoItem>(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(item)
    }

    async fn list_items(
        &mut self,
        owner: &str,
        skip: i64,
        take: i64,
    ) -> Result<Vec<TodoItem>, DatabaseError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM todo_items t \
             JOIN users u ON u.id = t.user_id \
             WHERE u.username = $1 \
             ORDER BY t.id ASC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, TodoItem>(&sql)
            .bind(owner)
            .bind(take)
            .bind(skip)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(items)
    }

    async fn count_items(&mut self, owner: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM todo_items t \
             JOIN users u ON u.id = t.user_id \
             WHERE u.username = $1",
        )
        .bind(owner)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count)
    }

    async fn insert_item(&mut self, item: NewTodoItem) -> Result<TodoItem, DatabaseError> {
        let created = sqlx::query_as::<_, TodoItem>(
            "INSERT INTO todo_items (title, is_completed, created_on, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, is_completed, created_on, user_id",
        )
        .bind(&item.title)
        .bind(item.is_completed)
        .bind(item.created_on)
        .bind(item.user_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(created)
    }

    async fn set_completed(&mut self, id: i64, is_completed: bool) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE todo_items SET is_completed = $1 WHERE id = $2")
            .bind(is_completed)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_item(&mut self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM todo_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}
