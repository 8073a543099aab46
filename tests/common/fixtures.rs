//! Test fixtures: a `Conversation` wired to in-memory doubles

#![allow(dead_code)]

use std::sync::Arc;

use lexibot::chat::{CallbackAction, Conversation, OutgoingMessage};
use lexibot::i18n;
use lexibot::session::{SessionManager, SharedSession};
use lexibot::storage::StoredUser;
use lexibot::testing::{MemoryStore, RecordingTransport, StaticTranslator};
use lexibot::vocab::VocabularyEntry;
use unic_langid::LanguageIdentifier;

/// Chat used by every test unless stated otherwise
pub const CHAT_ID: i64 = 123456789;

pub fn en() -> LanguageIdentifier {
    i18n::lang_from_code("en")
}

fn dictionary() -> StaticTranslator {
    StaticTranslator::default()
        .with("cat", &["חתול", "חתולה"])
        .with("dog", &["כלב"])
        .with("sun", &["שמש"])
        .with("moon", &["ירח"])
        .with("tree", &["עץ"])
        .with("ice cream", &["גלידה"])
}

/// Complete test environment for conversation tests
pub struct TestEnvironment {
    pub conversation: Conversation,
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryStore>,
    pub translator: Arc<StaticTranslator>,
}

impl TestEnvironment {
    /// Environment with no users
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    /// Environment with one stored user owning `words`
    pub fn with_words(words: &[&str], sender_active: bool, delay_minutes: u32) -> Self {
        Self::with_users(vec![StoredUser {
            chat_id: CHAT_ID,
            delay_minutes,
            sender_active,
            words: words
                .iter()
                .map(|w| VocabularyEntry::new(*w, vec![format!("{}-tr", w)]))
                .collect(),
        }])
    }

    pub fn with_users(users: Vec<StoredUser>) -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let store = Arc::new(MemoryStore::with_users(users));
        let translator = Arc::new(dictionary());
        let sessions = Arc::new(SessionManager::load(store.clone()).expect("load sessions"));
        let conversation = Conversation::new(sessions, transport.clone(), translator.clone(), en());
        Self {
            conversation,
            transport,
            store,
            translator,
        }
    }

    pub fn session(&self) -> SharedSession {
        self.conversation.sessions().get(CHAT_ID).expect("session exists")
    }

    /// Every message sent to the test chat
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.transport.sent_to(CHAT_ID)
    }

    pub fn last(&self) -> OutgoingMessage {
        self.transport.last_sent(CHAT_ID).expect("a message was sent")
    }

    /// Whether any message sent to the test chat contains `needle`
    pub fn any_text_contains(&self, needle: &str) -> bool {
        self.sent().iter().any(|m| m.text.contains(needle))
    }

    pub async fn press(&self, action: CallbackAction) {
        self.conversation
            .on_callback(CHAT_ID, action)
            .await
            .expect("callback handled");
    }

    pub async fn type_text(&self, text: &str) {
        let id = self.transport.next_ref();
        self.conversation
            .on_text(CHAT_ID, Some(id), text)
            .await
            .expect("text handled");
    }
}
