pub mod todo_item;
pub mod user;

pub use todo_item::{NewTodoItem, TodoItem};
pub use user::User;
