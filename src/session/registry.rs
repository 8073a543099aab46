//! Registry of all user sessions.
//!
//! Lookups and inserts go through a `DashMap`; each session has its own
//! async mutex so one user's work never blocks another's.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::core::config::schedule::DEFAULT_DELAY_MINUTES;
use crate::core::error::AppResult;
use crate::session::user::UserSession;
use crate::storage::WordStore;

pub type SharedSession = Arc<Mutex<UserSession>>;

pub struct SessionManager {
    sessions: DashMap<i64, SharedSession>,
    store: Arc<dyn WordStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn WordStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
        }
    }

    /// Builds the registry from every stored user.
    pub fn load(store: Arc<dyn WordStore>) -> AppResult<Self> {
        let users = store.load_all_users()?;
        let manager = Self::new(store);
        for user in users {
            manager
                .sessions
                .insert(user.chat_id, Arc::new(Mutex::new(UserSession::from_stored(user))));
        }
        log::info!("Loaded {} user session(s)", manager.sessions.len());
        Ok(manager)
    }

    pub fn store(&self) -> Arc<dyn WordStore> {
        Arc::clone(&self.store)
    }

    pub fn get(&self, chat_id: i64) -> Option<SharedSession> {
        self.sessions.get(&chat_id).map(|s| Arc::clone(s.value()))
    }

    /// Returns the session for `chat_id`, creating and persisting a new user
    /// first if needed. The flag is true when the user was created.
    pub fn get_or_create(&self, chat_id: i64) -> AppResult<(SharedSession, bool)> {
        match self.sessions.entry(chat_id) {
            Entry::Occupied(entry) => Ok((Arc::clone(entry.get()), false)),
            Entry::Vacant(entry) => {
                self.store.create_user(chat_id, DEFAULT_DELAY_MINUTES)?;
                log::info!("Registered new user {}", chat_id);
                let session = Arc::new(Mutex::new(UserSession::new(chat_id, DEFAULT_DELAY_MINUTES)));
                entry.insert(Arc::clone(&session));
                Ok((session, true))
            }
        }
    }

    /// Snapshot of all sessions, ordered by chat id.
    pub fn all(&self) -> Vec<SharedSession> {
        let mut sessions: Vec<(i64, SharedSession)> = self
            .sessions
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        sessions.sort_by_key(|(id, _)| *id);
        sessions.into_iter().map(|(_, s)| s).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoredUser;
    use crate::testing::MemoryStore;
    use crate::vocab::VocabularyEntry;

    #[tokio::test]
    async fn test_load_restores_users() {
        let store = Arc::new(MemoryStore::with_users(vec![
            StoredUser {
                chat_id: 2,
                delay_minutes: 30,
                sender_active: true,
                words: vec![VocabularyEntry::new("cat", vec!["חתול".into()])],
            },
            StoredUser {
                chat_id: 1,
                delay_minutes: 60,
                sender_active: false,
                words: vec![],
            },
        ]));
        let manager = SessionManager::load(store).unwrap();
        assert_eq!(manager.len(), 2);

        {
            let shared = manager.get(2).unwrap();
            let s = shared.lock().await;
            assert_eq!(s.delay_minutes(), 30);
            assert!(s.state().is_sender_active());
            assert!(s.vocabulary().contains("cat"));
            assert!(!s.has_timer());
        }

        let ids: Vec<i64> = {
            let mut ids = Vec::new();
            for s in manager.all() {
                ids.push(s.lock().await.chat_id());
            }
            ids
        };
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_get_or_create_persists_once() {
        let store = Arc::new(MemoryStore::default());
        let manager = SessionManager::new(store.clone());
        assert!(manager.get(5).is_none());

        let (_, created) = manager.get_or_create(5).unwrap();
        assert!(created);
        let (_, created) = manager.get_or_create(5).unwrap();
        assert!(!created);

        assert_eq!(store.delay(5), Some(DEFAULT_DELAY_MINUTES));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_store_failure() {
        let store = Arc::new(MemoryStore::default());
        store.fail_writes(true);
        let manager = SessionManager::new(store);
        assert!(manager.get_or_create(5).is_err());
        assert!(manager.is_empty());
    }
}
