pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use models::{NewTodoItem, TodoItem, User};
pub use postgres::PgStore;
pub use store::{StoreSession, TodoStore};
