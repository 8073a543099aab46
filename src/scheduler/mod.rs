//! Automatic word sender.
//!
//! Each active session owns one tokio task that counts down `delay_minutes`
//! and then dispatches a quiz. The countdown restarts from a full period on
//! every fire and whenever the session resumes; cancellation goes through a
//! `CancellationToken` so the task never outlives its session's sender.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use unic_langid::LanguageIdentifier;

use crate::chat::screens;
use crate::chat::transport::Transport;
use crate::core::config::vocabulary::MIN_WORDS;
use crate::core::error::AppResult;
use crate::session::{SessionManager, SharedSession, UserSession};
use crate::storage::WordStore;
use crate::vocab::{select_quiz, Quiz};

/// Control handle of a running timer task.
#[derive(Debug)]
pub struct SenderHandle {
    cancel: CancellationToken,
    reset: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SenderHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Restarts the countdown from a full period.
    pub fn reset_countdown(&self) {
        self.reset.notify_one();
    }

    /// Cancels the task and waits for it to finish.
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            log::error!("Word sender task ended abnormally: {}", e);
        }
    }
}

/// Sends quizzes and manages the per-user timer tasks.
#[derive(Clone)]
pub struct WordSender {
    transport: Arc<dyn Transport>,
    store: Arc<dyn WordStore>,
    lang: LanguageIdentifier,
}

impl WordSender {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn WordStore>, lang: LanguageIdentifier) -> Self {
        Self { transport, store, lang }
    }

    /// Deletes every tracked message of the session. Failures are logged only.
    pub async fn clean_chat(&self, session: &mut UserSession) {
        let pending = session.take_pending_messages();
        if pending.is_empty() {
            return;
        }
        if let Err(e) = self.transport.delete_messages(session.chat_id(), &pending).await {
            log::warn!("Failed to clean chat {}: {}", session.chat_id(), e);
        }
    }

    /// Selects a word, sends the quiz and counts it.
    ///
    /// Usage is incremented only after the quiz was delivered. On success the
    /// sender is paused until the user answers.
    pub async fn dispatch_quiz(&self, session: &mut UserSession) -> AppResult<Quiz> {
        let quiz = {
            let mut rng = rand::rng();
            select_quiz(session.vocabulary(), &mut rng)?
        };

        self.clean_chat(session).await;
        let sent = self
            .transport
            .send(session.chat_id(), screens::quiz(&self.lang, &quiz))
            .await?;
        session.track_message(sent);

        if let Err(e) = session.record_usage(self.store.as_ref(), &quiz.word) {
            log::error!(
                "Quiz for '{}' delivered to {} but usage was not saved: {}",
                quiz.word,
                session.chat_id(),
                e
            );
        }

        log::info!("Sent quiz '{}' to user {}", quiz.word, session.chat_id());
        session.set_current_quiz(quiz.clone());
        session.pause_sender();
        Ok(quiz)
    }

    /// Switches the sender on and starts its timer.
    pub fn activate(&self, shared: &SharedSession, session: &mut UserSession) -> AppResult<()> {
        session.enable_sender(self.store.as_ref())?;
        if !session.has_timer() {
            session.attach_timer(self.spawn_timer(Arc::clone(shared)));
        }
        log::info!(
            "Word sender activated for user {} ({} min)",
            session.chat_id(),
            session.delay_minutes()
        );
        Ok(())
    }

    /// Switches the sender off and cancels its timer.
    pub fn deactivate(&self, session: &mut UserSession) -> AppResult<bool> {
        let stopped = session.disable_sender(self.store.as_ref())?;
        if stopped {
            log::info!("Word sender deactivated for user {}", session.chat_id());
        }
        Ok(stopped)
    }

    /// Starts timers for every session stored as active. Sessions that lost
    /// too many words are switched off instead. Returns the number started.
    pub async fn restore_all(&self, sessions: &SessionManager) -> usize {
        let mut started = 0;
        for shared in sessions.all() {
            let mut session = shared.lock().await;
            if !session.state().is_sender_active() || session.has_timer() {
                continue;
            }
            if session.vocabulary().len() < MIN_WORDS {
                log::warn!(
                    "User {} has {} words, switching stored sender off",
                    session.chat_id(),
                    session.vocabulary().len()
                );
                if let Err(e) = self.store.set_sender_active(session.chat_id(), false) {
                    log::error!("Failed to persist sender off for user {}: {}", session.chat_id(), e);
                }
                session.force_inactive();
                continue;
            }
            session.attach_timer(self.spawn_timer(Arc::clone(&shared)));
            started += 1;
        }
        log::info!("Restored {} word sender(s)", started);
        started
    }

    /// Cancels every timer and waits for the tasks to finish. Stored sender
    /// state is kept so the timers come back on the next start.
    pub async fn close_all(&self, sessions: &SessionManager) {
        let mut handles = Vec::new();
        for shared in sessions.all() {
            let mut session = shared.lock().await;
            if let Some(handle) = session.take_timer() {
                handle.cancel();
                handles.push(handle);
            }
        }
        let count = handles.len();
        for handle in handles {
            handle.close().await;
        }
        log::info!("Closed {} word sender(s)", count);
    }

    fn spawn_timer(&self, session: SharedSession) -> SenderHandle {
        let cancel = CancellationToken::new();
        let reset = Arc::new(Notify::new());
        let task = tokio::spawn(run_timer(
            self.clone(),
            session,
            cancel.clone(),
            Arc::clone(&reset),
        ));
        SenderHandle { cancel, reset, task }
    }
}

async fn run_timer(sender: WordSender, session: SharedSession, cancel: CancellationToken, reset: Arc<Notify>) {
    loop {
        let (period, resumes) = {
            let guard = session.lock().await;
            (guard.period(), guard.resume_count())
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = reset.notified() => continue,
            _ = tokio::time::sleep(period) => {}
        }

        let mut guard = session.lock().await;
        if cancel.is_cancelled() {
            break;
        }
        // Resumed while this fire waited for the lock: count down again
        if guard.resume_count() != resumes {
            log::debug!("Countdown for user {} restarted by a resume", guard.chat_id());
            continue;
        }
        if !guard.state().can_dispatch() {
            log::debug!("Skipping quiz for user {}: sender busy", guard.chat_id());
            continue;
        }
        if let Err(e) = sender.dispatch_quiz(&mut guard).await {
            log::warn!("Scheduled quiz for user {} failed: {}", guard.chat_id(), e);
        }
    }
}
