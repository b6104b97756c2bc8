use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::TodoItemInput;

/// Longest title the `todo_items.title` column accepts.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Field name → messages, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Checks request input before it reaches the store.
pub trait InputValidator: Send + Sync {
    fn validate(&self, input: &TodoItemInput) -> Result<(), ValidationErrors>;
}

/// Default rules for creating an item.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoItemInputValidator;

impl InputValidator for TodoItemInputValidator {
    fn validate(&self, input: &TodoItemInput) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if input.title.trim().is_empty() {
            errors.add("title", "'Title' must not be empty.");
        } else if input.title.chars().count() > MAX_TITLE_LENGTH {
            errors.add(
                "title",
                format!("'Title' must be {} characters or fewer.", MAX_TITLE_LENGTH),
            );
        }

        errors.into_result()
    }
}
