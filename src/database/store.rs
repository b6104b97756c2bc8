use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{NewTodoItem, TodoItem, User};

/// Persistence engine handle shared by every request.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Open a transaction scoped to a single operation.
    ///
    /// Dropping the returned session without calling [`StoreSession::commit`]
    /// rolls back everything it wrote.
    async fn begin(&self) -> Result<Box<dyn StoreSession>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Owner-scoped data access inside one transaction.
///
/// Every item lookup takes the owner's username alongside the id, so an item
/// belonging to someone else is indistinguishable from a missing one.
#[async_trait]
pub trait StoreSession: Send {
    async fn find_user(&mut self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_item(&mut self, owner: &str, id: i64) -> Result<Option<TodoItem>, DatabaseError>;

    /// Items owned by `owner`, ordered by id ascending.
    async fn list_items(
        &mut self,
        owner: &str,
        skip: i64,
        take: i64,
    ) -> Result<Vec<TodoItem>, DatabaseError>;

    async fn count_items(&mut self, owner: &str) -> Result<i64, DatabaseError>;

    async fn insert_item(&mut self, item: NewTodoItem) -> Result<TodoItem, DatabaseError>;

    /// `false` when no row with `id` exists any more.
    async fn set_completed(&mut self, id: i64, is_completed: bool) -> Result<bool, DatabaseError>;

    /// `false` when no row with `id` exists any more.
    async fn delete_item(&mut self, id: i64) -> Result<bool, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}
