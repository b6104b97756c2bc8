use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::database::{DatabaseError, NewTodoItem, TodoStore};
use crate::types::{PagedResults, TodoItemInput, TodoItemOutput};

use super::pagination::Pagination;
use super::validation::{InputValidator, TodoItemInputValidator, ValidationErrors};

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// Missing, or owned by someone else.
    #[error("Todo item not found")]
    NotFound,

    #[error("Unexpected: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<ValidationErrors> for TodoError {
    fn from(errors: ValidationErrors) -> Self {
        TodoError::ValidationFailed(errors)
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTodoItem {
    pub id: i64,
    /// Path of the new resource, e.g. `/todoitems/4`.
    pub location: String,
    pub item: TodoItemOutput,
}

/// Owner-scoped to-do operations. Every call opens its own store session.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    validator: Arc<dyn InputValidator>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self::with_validator(store, Arc::new(TodoItemInputValidator))
    }

    pub fn with_validator(store: Arc<dyn TodoStore>, validator: Arc<dyn InputValidator>) -> Self {
        Self { store, validator }
    }

    pub async fn list(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<PagedResults<TodoItemOutput>, TodoError> {
        let mut session = self.store.begin().await?;
        let items = session
            .list_items(username, pagination.skip(), pagination.take())
            .await?;
        let total_records = session.count_items(username).await?;
        session.commit().await?;

        debug!(
            "Listed {} of {} items for '{}' (page {}, size {})",
            items.len(),
            total_records,
            username,
            pagination.page(),
            pagination.page_size()
        );

        Ok(PagedResults {
            page_number: pagination.page(),
            page_size: pagination.page_size(),
            results: items.into_iter().map(TodoItemOutput::from).collect(),
            total_number_of_pages: pagination.total_pages(total_records),
            total_number_of_records: total_records,
        })
    }

    pub async fn get(&self, username: &str, id: i64) -> Result<TodoItemOutput, TodoError> {
        let mut session = self.store.begin().await?;
        let item = session
            .find_item(username, id)
            .await?
            .ok_or(TodoError::NotFound)?;
        session.commit().await?;
        Ok(item.into())
    }

    pub async fn create(
        &self,
        username: &str,
        input: TodoItemInput,
    ) -> Result<CreatedTodoItem, TodoError> {
        self.validator.validate(&input)?;

        let mut session = self.store.begin().await?;
        // The token was valid, so a missing account is a data problem, not a 404.
        let user = session.find_user(username).await?.ok_or_else(|| {
            TodoError::Unexpected(format!("authenticated user '{}' has no account", username))
        })?;

        let item = session
            .insert_item(NewTodoItem {
                title: input.title,
                is_completed: input.is_completed,
                created_on: Utc::now(),
                user_id: user.id,
            })
            .await?;
        session.commit().await?;

        debug!("Created todo item {} for '{}'", item.id, username);

        Ok(CreatedTodoItem {
            id: item.id,
            location: format!("/todoitems/{}", item.id),
            item: item.into(),
        })
    }

    /// Only the completion flag is applied; the title is left as it was.
    pub async fn update(
        &self,
        username: &str,
        id: i64,
        input: TodoItemInput,
    ) -> Result<(), TodoError> {
        let mut session = self.store.begin().await?;
        let item = session
            .find_item(username, id)
            .await?
            .ok_or(TodoError::NotFound)?;
        if !session.set_completed(item.id, input.is_completed).await? {
            return Err(TodoError::NotFound);
        }
        session.commit().await?;

        debug!(
            "Set todo item {} completed={} for '{}'",
            id, input.is_completed, username
        );
        Ok(())
    }

    pub async fn delete(&self, username: &str, id: i64) -> Result<(), TodoError> {
        let mut session = self.store.begin().await?;
        let item = session
            .find_item(username, id)
            .await?
            .ok_or(TodoError::NotFound)?;
        if !session.delete_item(item.id).await? {
            return Err(TodoError::NotFound);
        }
        session.commit().await?;

        debug!("Deleted todo item {} for '{}'", id, username);
        Ok(())
    }
}
