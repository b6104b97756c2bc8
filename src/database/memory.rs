use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::manager::DatabaseError;
use super::models::{NewTodoItem, TodoItem, User};
use super::store::{StoreSession, TodoStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, TodoItem>,
    last_user_id: i64,
    last_item_id: i64,
}

impl MemoryState {
    fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    fn owned_items<'a>(&'a self, owner: &str) -> impl Iterator<Item = &'a TodoItem> + 'a {
        let owner_id = self.user_by_name(owner).map(|u| u.id);
        self.items
            .values()
            .filter(move |item| Some(item.user_id) == owner_id)
    }

    fn insert_user(&mut self, username: &str) -> Result<User, DatabaseError> {
        if self.user_by_name(username).is_some() {
            return Err(DatabaseError::Integrity(format!(
                "user '{}' already exists",
                username
            )));
        }
        self.last_user_id += 1;
        let user = User {
            id: self.last_user_id,
            username: username.to_string(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn insert_item(&mut self, item: NewTodoItem) -> Result<TodoItem, DatabaseError> {
        if !self.users.contains_key(&item.user_id) {
            return Err(DatabaseError::Integrity(format!(
                "user id {} does not exist",
                item.user_id
            )));
        }
        self.last_item_id += 1;
        let created = TodoItem {
            id: self.last_item_id,
            title: item.title,
            is_completed: item.is_completed,
            created_on: item.created_on,
            user_id: item.user_id,
        };
        self.items.insert(created.id, created.clone());
        Ok(created)
    }
}

/// In-process store for tests and database-less development.
///
/// Cloning shares the underlying data. A session holds the store lock for its
/// whole lifetime and works on a private copy, so sessions are serialized and
/// an uncommitted session leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, username: &str) -> Result<User, DatabaseError> {
        self.state.lock().await.insert_user(username)
    }

    /// Insert an item for an existing user, timestamped now.
    pub async fn add_item(
        &self,
        owner: &str,
        title: &str,
        is_completed: bool,
    ) -> Result<TodoItem, DatabaseError> {
        let mut state = self.state.lock().await;
        let user_id = state
            .user_by_name(owner)
            .map(|u| u.id)
            .ok_or_else(|| DatabaseError::Integrity(format!("user '{}' does not exist", owner)))?;
        state.insert_item(NewTodoItem {
            title: title.to_string(),
            is_completed,
            created_on: Utc::now(),
            user_id,
        })
    }

    /// Total items across all owners.
    pub async fn item_count(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// Raw lookup bypassing ownership, for assertions.
    pub async fn item(&self, id: i64) -> Option<TodoItem> {
        self.state.lock().await.items.get(&id).cloned()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, DatabaseError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemorySession { guard, working }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

struct MemorySession {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn find_user(&mut self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.working.user_by_name(username).cloned())
    }

    async fn find_item(&mut self, owner: &str, id: i64) -> Result<Option<TodoItem>, DatabaseError> {
        Ok(self
            .working
            .owned_items(owner)
            .find(|item| item.id == id)
            .cloned())
    }

    async fn list_items(
        &mut self,
        owner: &str,
        skip: i64,
        take: i64,
    ) -> Result<Vec<TodoItem>, DatabaseError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(0);
        Ok(self
            .working
            .owned_items(owner)
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn count_items(&mut self, owner: &str) -> Result<i64, DatabaseError> {
        let count = self.working.owned_items(owner).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn insert_item(&mut self, item: NewTodoItem) -> Result<TodoItem, DatabaseError> {
        self.working.insert_item(item)
    }

    async fn set_completed(&mut self, id: i64, is_completed: bool) -> Result<bool, DatabaseError> {
        match self.working.items.get_mut(&id) {
            Some(item) => {
                item.is_completed = is_completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_item(&mut self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.working.items.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemorySession { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_user("admin").await.unwrap();
        store.add_user("guest").await.unwrap();
        store.add_item("admin", "first", false).await.unwrap();
        store.add_item("guest", "theirs", false).await.unwrap();
        store.add_item("admin", "second", true).await.unwrap();
        store
    }

    #[tokio::test]
    async fn duplicate_user_is_rejected() {
        let store = MemoryStore::new();
        store.add_user("admin").await.unwrap();
        assert!(matches!(
            store.add_user("admin").await,
            Err(DatabaseError::Integrity(_))
        ));
    }

    #[tokio::test]
    async fn lookups_are_owner_scoped() {
        let store = seeded().await;
        let mut session = store.begin().await.unwrap();

        assert_eq!(session.find_item("admin", 1).await.unwrap().unwrap().title, "first");
        assert!(session.find_item("admin", 2).await.unwrap().is_none());
        assert!(session.find_item("guest", 1).await.unwrap().is_none());
        assert!(session.find_item("nobody", 1).await.unwrap().is_none());

        let ids: Vec<i64> = session
            .list_items("admin", 0, 10)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(session.count_items("admin").await.unwrap(), 2);
        assert_eq!(session.count_items("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_applies_skip_and_take() {
        let store = seeded().await;
        let mut session = store.begin().await.unwrap();

        let page = session.list_items("admin", 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
        assert!(session.list_items("admin", 5, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropped_session_rolls_back() {
        let store = seeded().await;
        {
            let mut session = store.begin().await.unwrap();
            assert!(session.delete_item(1).await.unwrap());
            assert!(session.set_completed(3, false).await.unwrap());
        }
        assert_eq!(store.item_count().await, 3);
        assert!(store.item(3).await.unwrap().is_completed);
    }

    #[tokio::test]
    async fn committed_session_persists() {
        let store = seeded().await;
        let mut session = store.begin().await.unwrap();
        session.delete_item(1).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(store.item_count().await, 2);
        assert!(store.item(1).await.is_none());
    }

    #[tokio::test]
    async fn writes_report_missing_rows() {
        let store = seeded().await;
        let mut session = store.begin().await.unwrap();

        assert!(!session.set_completed(99, true).await.unwrap());
        assert!(!session.delete_item(99).await.unwrap());
        assert!(session.delete_item(1).await.unwrap());
        assert!(!session.delete_item(1).await.unwrap());
        assert!(!session.set_completed(1, true).await.unwrap());
    }

    #[tokio::test]
    async fn insert_requires_existing_owner() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        let result = session
            .insert_item(NewTodoItem {
                title: "orphan".to_string(),
                is_completed: false,
                created_on: Utc::now(),
                user_id: 42,
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Integrity(_))));
    }
}
