//! Persistence contract for user sessions.
//!
//! Sessions are an in-memory cache in front of this store. Every mutation is
//! written here first; the in-memory copy changes only if the write succeeded.

use crate::core::error::AppResult;
use crate::vocab::VocabularyEntry;

/// A user as loaded at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUser {
    pub chat_id: i64,
    pub delay_minutes: u32,
    pub sender_active: bool,
    pub words: Vec<VocabularyEntry>,
}

/// Storage backend for users and their words.
///
/// Implementations must be cheap to call from async code; the SQLite
/// implementation runs short statements on pooled connections.
pub trait WordStore: Send + Sync {
    fn load_all_users(&self) -> AppResult<Vec<StoredUser>>;

    fn create_user(&self, chat_id: i64, delay_minutes: u32) -> AppResult<()>;

    fn save_word(&self, chat_id: i64, entry: &VocabularyEntry) -> AppResult<()>;

    fn delete_word(&self, chat_id: i64, word: &str) -> AppResult<()>;

    fn update_delay(&self, chat_id: i64, minutes: u32) -> AppResult<()>;

    fn increment_usage(&self, chat_id: i64, word: &str) -> AppResult<()>;

    /// Remembers whether the automatic sender is on, so it restarts after a reboot.
    fn set_sender_active(&self, chat_id: i64, active: bool) -> AppResult<()>;
}
