//! Database access and the persistence contract used by sessions

pub mod db;
pub mod migrations;
pub mod traits;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool, SqliteStore};
pub use traits::{StoredUser, WordStore};
