pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter, UserFilter};
