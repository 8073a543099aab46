//! One user's in-memory session.
//!
//! Every mutation that must survive a restart is written to the store first;
//! the in-memory copy changes only when that write succeeded.

use std::time::Duration;

use crate::chat::transport::MessageRef;
use crate::core::config::{schedule, vocabulary::MIN_WORDS};
use crate::core::error::{AppError, AppResult};
use crate::core::validation::validate_delay;
use crate::scheduler::SenderHandle;
use crate::session::state::{PendingInput, SessionState};
use crate::storage::{StoredUser, WordStore};
use crate::vocab::{Quiz, Vocabulary, VocabularyEntry};

#[derive(Debug)]
pub struct UserSession {
    chat_id: i64,
    vocabulary: Vocabulary,
    delay_minutes: u32,
    state: SessionState,
    /// Messages to delete on the next `clean_chat`.
    pending_messages: Vec<MessageRef>,
    /// Last quiz sent and not yet answered.
    current_quiz: Option<Quiz>,
    sender: Option<SenderHandle>,
    /// Bumped on every resume; a countdown started before the latest
    /// resume must not fire.
    resumes: u64,
}

/// Outcome of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub entry: VocabularyEntry,
    /// The sender was switched off because too few words remain.
    pub sender_stopped: bool,
}

impl UserSession {
    pub fn new(chat_id: i64, delay_minutes: u32) -> Self {
        Self {
            chat_id,
            vocabulary: Vocabulary::new(),
            delay_minutes,
            state: SessionState::new(false),
            pending_messages: Vec::new(),
            current_quiz: None,
            sender: None,
            resumes: 0,
        }
    }

    /// Rebuilds a session from storage. No timer runs until one is attached.
    pub fn from_stored(user: StoredUser) -> Self {
        Self {
            chat_id: user.chat_id,
            vocabulary: Vocabulary::from_entries(user.words),
            delay_minutes: user.delay_minutes,
            state: SessionState::new(user.sender_active),
            pending_messages: Vec::new(),
            current_quiz: None,
            sender: None,
            resumes: 0,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    pub fn period(&self) -> Duration {
        schedule::period(self.delay_minutes)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_quiz(&self) -> Option<&Quiz> {
        self.current_quiz.as_ref()
    }

    pub fn set_current_quiz(&mut self, quiz: Quiz) {
        self.current_quiz = Some(quiz);
    }

    pub fn take_current_quiz(&mut self) -> Option<Quiz> {
        self.current_quiz.take()
    }

    // --- interaction lock ---

    pub fn lock(&mut self, input: PendingInput) -> AppResult<()> {
        self.state.lock(input)
    }

    pub fn unlock(&mut self) -> Option<PendingInput> {
        self.state.unlock()
    }

    // --- write-through mutations ---

    /// Persists and inserts an entry built by `Vocabulary::prepare_entry`.
    pub fn add_word(&mut self, store: &dyn WordStore, entry: VocabularyEntry) -> AppResult<()> {
        // The list may have changed while the translation was looked up
        self.vocabulary.check_new_word(&entry.word)?;
        store.save_word(self.chat_id, &entry)?;
        log::info!("User {} added '{}'", self.chat_id, entry.word);
        self.vocabulary.insert(entry);
        Ok(())
    }

    /// Removes a word; switches the sender off when fewer than `MIN_WORDS` remain.
    pub fn delete_word(&mut self, store: &dyn WordStore, word: &str) -> AppResult<DeleteOutcome> {
        if !self.vocabulary.contains(word) {
            return Err(AppError::WordNotFound(word.to_string()));
        }
        store.delete_word(self.chat_id, word)?;
        let entry = self.vocabulary.delete(word)?;
        log::info!("User {} deleted '{}'", self.chat_id, word);

        let mut sender_stopped = false;
        if self.state.is_sender_active() && self.vocabulary.len() < MIN_WORDS {
            if let Err(e) = store.set_sender_active(self.chat_id, false) {
                log::error!("Failed to persist sender off for user {}: {}", self.chat_id, e);
            }
            self.stop_sender();
            sender_stopped = true;
        }

        Ok(DeleteOutcome { entry, sender_stopped })
    }

    pub fn set_delay(&mut self, store: &dyn WordStore, minutes: u32) -> AppResult<()> {
        validate_delay(minutes)?;
        store.update_delay(self.chat_id, minutes)?;
        self.delay_minutes = minutes;
        Ok(())
    }

    /// Counts one delivered quiz for `word`.
    pub fn record_usage(&mut self, store: &dyn WordStore, word: &str) -> AppResult<()> {
        store.increment_usage(self.chat_id, word)?;
        self.vocabulary.increase_usage(word);
        Ok(())
    }

    /// Marks the sender active in storage and in memory. The timer is
    /// started separately.
    pub fn enable_sender(&mut self, store: &dyn WordStore) -> AppResult<()> {
        self.state.check_activation(self.vocabulary.len())?;
        if !self.state.is_sender_active() {
            store.set_sender_active(self.chat_id, true)?;
        }
        self.state.activate(self.vocabulary.len())
    }

    /// Marks the sender inactive and cancels its timer. Returns false if it
    /// was already off.
    pub fn disable_sender(&mut self, store: &dyn WordStore) -> AppResult<bool> {
        if !self.state.is_sender_active() {
            return Ok(false);
        }
        store.set_sender_active(self.chat_id, false)?;
        self.stop_sender();
        Ok(true)
    }

    fn stop_sender(&mut self) {
        self.state.deactivate();
        if let Some(handle) = self.sender.take() {
            handle.cancel();
        }
    }

    // --- timer ---

    pub fn pause_sender(&mut self) {
        if self.state.pause() {
            log::debug!("Sender paused for user {}", self.chat_id);
        }
    }

    /// Unpauses and restarts the countdown from a full period.
    pub fn resume_sender(&mut self) {
        if self.state.resume() {
            self.resumes += 1;
            log::debug!("Sender resumed for user {}", self.chat_id);
            if let Some(handle) = &self.sender {
                handle.reset_countdown();
            }
        }
    }

    /// Number of resumes so far.
    pub fn resume_count(&self) -> u64 {
        self.resumes
    }

    pub fn has_timer(&self) -> bool {
        self.sender.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Installs a running timer, cancelling any previous one.
    pub fn attach_timer(&mut self, handle: SenderHandle) {
        if let Some(old) = self.sender.replace(handle) {
            old.cancel();
        }
    }

    pub fn take_timer(&mut self) -> Option<SenderHandle> {
        self.sender.take()
    }

    /// Switches the sender off in memory only, e.g. when a stored active
    /// user no longer has enough words at startup.
    pub fn force_inactive(&mut self) {
        self.stop_sender();
    }

    // --- chat tracking ---

    pub fn track_message(&mut self, message: MessageRef) {
        self.pending_messages.push(message);
    }

    pub fn take_pending_messages(&mut self) -> Vec<MessageRef> {
        std::mem::take(&mut self.pending_messages)
    }

    pub fn pending_messages(&self) -> &[MessageRef] {
        &self.pending_messages
    }
}
