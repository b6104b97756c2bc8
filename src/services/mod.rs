pub mod pagination;
pub mod todo_service;
pub mod validation;

pub use pagination::Pagination;
pub use todo_service::{CreatedTodoItem, TodoError, TodoService};
pub use validation::{InputValidator, TodoItemInputValidator, ValidationErrors};
