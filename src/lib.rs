//! Lexibot - Telegram bot for learning your own English vocabulary
//!
//! Users build a personal word list; the bot looks up translations and
//! periodically quizzes them with four-option questions, favouring the
//! words they have seen least.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, and input validation
//! - `vocab`: Word lists and weighted quiz selection
//! - `storage`: SQLite persistence behind the `WordStore` trait
//! - `translate`: Translation lookup client
//! - `session`: Per-user sessions, their state machine and the registry
//! - `scheduler`: Per-user timer tasks that send quizzes
//! - `chat`: Interaction flows and screens, independent of Telegram
//! - `telegram`: Telegram bot integration and handlers
//! - `testing`: In-memory doubles for the external seams

pub mod chat;
pub mod cli;
pub mod core;
pub mod i18n;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod telegram;
pub mod testing;
pub mod translate;
pub mod vocab;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use session::{SessionManager, UserSession};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, SqliteStore, WordStore};
