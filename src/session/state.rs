//! Per-user interaction and sender state.
//!
//! Two independent axes:
//! - interaction: `Idle` or `Locked` while a free-text reply is awaited
//! - sender: `Inactive` or `Active { paused }`
//!
//! All transition checks live here; handlers never test raw flags.

use crate::core::config::vocabulary::MIN_WORDS;
use crate::core::error::{AppError, AppResult};

/// The free-text reply a locked session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    NewWord,
    NewDelay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    Locked(PendingInput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    Inactive,
    /// `paused` suspends the timer without switching the sender off.
    Active { paused: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    interaction: Interaction,
    sender: SenderState,
}

impl SessionState {
    pub fn new(sender_active: bool) -> Self {
        Self {
            interaction: Interaction::Idle,
            sender: if sender_active {
                SenderState::Active { paused: false }
            } else {
                SenderState::Inactive
            },
        }
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn sender(&self) -> SenderState {
        self.sender
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.interaction, Interaction::Locked(_))
    }

    pub fn pending_input(&self) -> Option<PendingInput> {
        match self.interaction {
            Interaction::Locked(input) => Some(input),
            Interaction::Idle => None,
        }
    }

    /// Fails with `SessionLocked` while a reply is awaited.
    pub fn ensure_idle(&self) -> AppResult<()> {
        if self.is_locked() {
            return Err(AppError::SessionLocked);
        }
        Ok(())
    }

    /// Idle -> Locked. A second lock is rejected.
    pub fn lock(&mut self, input: PendingInput) -> AppResult<()> {
        self.ensure_idle()?;
        self.interaction = Interaction::Locked(input);
        Ok(())
    }

    /// Locked -> Idle, returning what was awaited.
    pub fn unlock(&mut self) -> Option<PendingInput> {
        let pending = self.pending_input();
        self.interaction = Interaction::Idle;
        pending
    }

    pub fn is_sender_active(&self) -> bool {
        matches!(self.sender, SenderState::Active { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.sender, SenderState::Active { paused: true })
    }

    /// Checks the word-count requirement without changing state.
    pub fn check_activation(&self, word_count: usize) -> AppResult<()> {
        if word_count < MIN_WORDS {
            return Err(AppError::InsufficientVocabulary {
                have: word_count,
                need: MIN_WORDS,
            });
        }
        Ok(())
    }

    /// Inactive -> Active (unpaused). Already active is a no-op.
    pub fn activate(&mut self, word_count: usize) -> AppResult<()> {
        self.check_activation(word_count)?;
        if !self.is_sender_active() {
            self.sender = SenderState::Active { paused: false };
        }
        Ok(())
    }

    /// Active -> Inactive. Returns whether the sender was active.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.is_sender_active();
        self.sender = SenderState::Inactive;
        was_active
    }

    /// Returns true if the state changed. No-op while inactive.
    pub fn pause(&mut self) -> bool {
        match self.sender {
            SenderState::Active { paused: false } => {
                self.sender = SenderState::Active { paused: true };
                true
            }
            _ => false,
        }
    }

    /// Returns true if the state changed. No-op while inactive.
    pub fn resume(&mut self) -> bool {
        match self.sender {
            SenderState::Active { paused: true } => {
                self.sender = SenderState::Active { paused: false };
                true
            }
            _ => false,
        }
    }

    /// A quiz may be sent automatically: active, not paused, not locked.
    pub fn can_dispatch(&self) -> bool {
        matches!(self.sender, SenderState::Active { paused: false }) && !self.is_locked()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(false)
    }
}
