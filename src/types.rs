//! Transfer representations exchanged over HTTP

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::TodoItem;

/// Inbound body for create and update. Update only reads `is_completed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl TodoItemInput {
    pub fn new(title: impl Into<String>, is_completed: bool) -> Self {
        Self {
            title: title.into(),
            is_completed,
        }
    }
}

/// Outbound item. Id and owner are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemOutput {
    pub title: String,
    pub is_completed: bool,
    pub created_on: DateTime<Utc>,
}

impl From<TodoItem> for TodoItemOutput {
    fn from(item: TodoItem) -> Self {
        Self {
            title: item.title,
            is_completed: item.is_completed,
            created_on: item.created_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResults<T> {
    pub page_number: u32,
    pub page_size: u32,
    pub results: Vec<T>,
    pub total_number_of_pages: i64,
    pub total_number_of_records: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_fields_default_when_missing() {
        let input: TodoItemInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input, TodoItemInput::default());

        let input: TodoItemInput = serde_json::from_value(json!({ "isCompleted": true })).unwrap();
        assert!(input.is_completed);
        assert!(input.title.is_empty());
    }

    #[test]
    fn output_uses_camel_case_and_hides_ids() {
        let item = TodoItem {
            id: 7,
            title: "write docs".to_string(),
            is_completed: true,
            created_on: Utc::now(),
            user_id: 3,
        };
        let value = serde_json::to_value(TodoItemOutput::from(item)).unwrap();
        assert_eq!(value["title"], "write docs");
        assert_eq!(value["isCompleted"], true);
        assert!(value.get("createdOn").is_some());
        assert!(value.get("id").is_none());
        assert!(value.get("userId").is_none());
    }
}
