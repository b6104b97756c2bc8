use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account row. Created out of band; the username matches the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}
