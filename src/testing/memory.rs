use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::{AppError, AppResult};
use crate::storage::{StoredUser, WordStore};
use crate::translate::Translator;
use crate::vocab::VocabularyEntry;

fn io_error() -> AppError {
    AppError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        Some("simulated write failure".to_string()),
    ))
}

#[derive(Debug, Clone)]
struct MemoryUser {
    delay_minutes: u32,
    sender_active: bool,
    words: BTreeMap<String, VocabularyEntry>,
}

/// `WordStore` backed by a map. Writes fail with a database error while
/// `fail_writes(true)` is set; reads always succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<i64, MemoryUser>>,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn with_users(users: Vec<StoredUser>) -> Self {
        let store = Self::default();
        {
            let mut map = store.lock();
            for user in users {
                map.insert(
                    user.chat_id,
                    MemoryUser {
                        delay_minutes: user.delay_minutes,
                        sender_active: user.sender_active,
                        words: user.words.into_iter().map(|e| (e.word.clone(), e)).collect(),
                    },
                );
            }
        }
        store
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn words(&self, chat_id: i64) -> Vec<String> {
        self.lock()
            .get(&chat_id)
            .map(|u| u.words.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn entry(&self, chat_id: i64, word: &str) -> Option<VocabularyEntry> {
        self.lock().get(&chat_id).and_then(|u| u.words.get(word).cloned())
    }

    pub fn usage(&self, chat_id: i64, word: &str) -> Option<u32> {
        self.entry(chat_id, word).map(|e| e.usage_count)
    }

    pub fn total_usage(&self, chat_id: i64) -> u32 {
        self.lock()
            .get(&chat_id)
            .map(|u| u.words.values().map(|e| e.usage_count).sum())
            .unwrap_or(0)
    }

    pub fn delay(&self, chat_id: i64) -> Option<u32> {
        self.lock().get(&chat_id).map(|u| u.delay_minutes)
    }

    pub fn sender_active(&self, chat_id: i64) -> bool {
        self.lock().get(&chat_id).is_some_and(|u| u.sender_active)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<i64, MemoryUser>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write<T>(&self, chat_id: i64, f: impl FnOnce(&mut MemoryUser) -> AppResult<T>) -> AppResult<T> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io_error());
        }
        let mut users = self.lock();
        let user = users
            .get_mut(&chat_id)
            .ok_or(AppError::Database(rusqlite::Error::QueryReturnedNoRows))?;
        f(user)
    }
}

impl WordStore for MemoryStore {
    fn load_all_users(&self) -> AppResult<Vec<StoredUser>> {
        Ok(self
            .lock()
            .iter()
            .map(|(chat_id, u)| StoredUser {
                chat_id: *chat_id,
                delay_minutes: u.delay_minutes,
                sender_active: u.sender_active,
                words: u.words.values().cloned().collect(),
            })
            .collect())
    }

    fn create_user(&self, chat_id: i64, delay_minutes: u32) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io_error());
        }
        self.lock().entry(chat_id).or_insert(MemoryUser {
            delay_minutes,
            sender_active: false,
            words: BTreeMap::new(),
        });
        Ok(())
    }

    fn save_word(&self, chat_id: i64, entry: &VocabularyEntry) -> AppResult<()> {
        self.write(chat_id, |u| {
            u.words.insert(entry.word.clone(), entry.clone());
            Ok(())
        })
    }

    fn delete_word(&self, chat_id: i64, word: &str) -> AppResult<()> {
        self.write(chat_id, |u| {
            u.words
                .remove(word)
                .map(|_| ())
                .ok_or(AppError::Database(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    fn update_delay(&self, chat_id: i64, minutes: u32) -> AppResult<()> {
        self.write(chat_id, |u| {
            u.delay_minutes = minutes;
            Ok(())
        })
    }

    fn increment_usage(&self, chat_id: i64, word: &str) -> AppResult<()> {
        self.write(chat_id, |u| {
            let entry = u
                .words
                .get_mut(word)
                .ok_or(AppError::Database(rusqlite::Error::QueryReturnedNoRows))?;
            entry.usage_count += 1;
            Ok(())
        })
    }

    fn set_sender_active(&self, chat_id: i64, active: bool) -> AppResult<()> {
        self.write(chat_id, |u| {
            u.sender_active = active;
            Ok(())
        })
    }
}

/// `Translator` answering from a fixed table. Unknown words have no translation.
#[derive(Debug, Default)]
pub struct StaticTranslator {
    table: HashMap<String, Vec<String>>,
    fail: AtomicBool,
}

impl StaticTranslator {
    pub fn with(mut self, word: &str, translations: &[&str]) -> Self {
        self.table
            .insert(word.to_string(), translations.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Translator for StaticTranslator {
    async fn translate(&self, word: &str) -> AppResult<Vec<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::TranslationLookupFailed("service unavailable".to_string()));
        }
        Ok(self.table.get(word).cloned().unwrap_or_default())
    }
}
