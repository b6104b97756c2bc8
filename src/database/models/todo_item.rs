use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_on: DateTime<Utc>,
    /// Owner; never changes after insert.
    pub user_id: i64,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTodoItem {
    pub title: String,
    pub is_completed: bool,
    pub created_on: DateTime<Utc>,
    pub user_id: i64,
}
