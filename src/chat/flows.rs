//! User-facing interaction flows.
//!
//! `Conversation` turns commands, free-text replies and button presses into
//! session changes and screens. It only talks to the outside world through
//! `Transport`, `Translator` and `WordStore`, so every flow runs the same
//! against Telegram and against the in-memory doubles.

use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;
use unic_langid::LanguageIdentifier;

use crate::chat::callback::{CallbackAction, MenuItem};
use crate::chat::screens;
use crate::chat::transport::{Button, MessageRef, OutgoingMessage, Transport};
use crate::core::config::{schedule, vocabulary};
use crate::core::error::{AppError, AppResult};
use crate::core::validation::parse_delay;
use crate::i18n;
use crate::scheduler::WordSender;
use crate::session::{PendingInput, SessionManager, SharedSession, UserSession};
use crate::storage::WordStore;
use crate::translate::Translator;
use crate::vocab::PageRange;

#[derive(Clone)]
pub struct Conversation {
    sessions: Arc<SessionManager>,
    sender: WordSender,
    transport: Arc<dyn Transport>,
    translator: Arc<dyn Translator>,
    store: Arc<dyn WordStore>,
    lang: LanguageIdentifier,
}

impl Conversation {
    pub fn new(
        sessions: Arc<SessionManager>,
        transport: Arc<dyn Transport>,
        translator: Arc<dyn Translator>,
        lang: LanguageIdentifier,
    ) -> Self {
        let store = sessions.store();
        let sender = WordSender::new(Arc::clone(&transport), Arc::clone(&store), lang.clone());
        Self {
            sessions,
            sender,
            transport,
            translator,
            store,
            lang,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn sender(&self) -> &WordSender {
        &self.sender
    }

    // --- commands ---

    /// `/start`: registers unknown users, then shows the menu.
    pub async fn on_start(&self, chat_id: i64, message: Option<MessageRef>) -> AppResult<()> {
        let (shared, created) = self.sessions.get_or_create(chat_id)?;
        let mut session = shared.lock().await;
        track(&mut session, message);
        if self.ignore_while_locked(&session) {
            return Ok(());
        }

        if created {
            let mut args = FluentArgs::new();
            args.set("min", vocabulary::MIN_WORDS);
            self.sender.clean_chat(&mut session).await;
            self.reply(&mut session, screens::text(&self.lang, "start-welcome"))
                .await?;
            self.reply(
                &mut session,
                screens::text_args(&self.lang, "start-add-words-hint", &args),
            )
            .await?;
            let menu = self.menu_screen(&session);
            return self.reply(&mut session, menu).await;
        }

        self.show_menu(&mut session).await
    }

    /// `/menu`
    pub async fn on_menu(&self, chat_id: i64, message: Option<MessageRef>) -> AppResult<()> {
        let (shared, _) = self.sessions.get_or_create(chat_id)?;
        let mut session = shared.lock().await;
        track(&mut session, message);
        if self.ignore_while_locked(&session) {
            return Ok(());
        }
        self.show_menu(&mut session).await
    }

    /// `/send`: quiz right now, same sequence as a timer fire.
    pub async fn on_send(&self, chat_id: i64, message: Option<MessageRef>) -> AppResult<()> {
        let (shared, _) = self.sessions.get_or_create(chat_id)?;
        let mut session = shared.lock().await;
        track(&mut session, message);
        if self.ignore_while_locked(&session) {
            return Ok(());
        }

        match self.sender.dispatch_quiz(&mut session).await {
            Ok(_) => Ok(()),
            Err(AppError::InsufficientVocabulary { have, need }) => {
                let mut args = FluentArgs::new();
                args.set("have", have);
                args.set("need", need);
                self.sender.clean_chat(&mut session).await;
                self.reply(
                    &mut session,
                    screens::text_args(&self.lang, "quiz-not-enough", &args).with_button(self.back_to_menu()),
                )
                .await
            }
            Err(e) => Err(e),
        }
    }

    /// `/priorities`: how often each word was sent.
    pub async fn on_priorities(&self, chat_id: i64, message: Option<MessageRef>) -> AppResult<()> {
        let (shared, _) = self.sessions.get_or_create(chat_id)?;
        let mut session = shared.lock().await;
        track(&mut session, message);
        if self.ignore_while_locked(&session) {
            return Ok(());
        }
        session.pause_sender();
        self.sender.clean_chat(&mut session).await;
        let table = screens::priorities_table(&self.lang, session.vocabulary()).with_button(self.back_to_menu());
        self.reply(&mut session, table).await
    }

    // --- free text ---

    /// A text message: answers a pending prompt, otherwise ignored.
    pub async fn on_text(&self, chat_id: i64, message: Option<MessageRef>, text: &str) -> AppResult<()> {
        let Some(shared) = self.sessions.get(chat_id) else {
            log::debug!("Text from unknown chat {}, ignoring", chat_id);
            return Ok(());
        };
        let mut session = shared.lock().await;
        track(&mut session, message);

        match session.state().pending_input() {
            Some(PendingInput::NewWord) => self.finish_add_word(&mut session, text).await,
            Some(PendingInput::NewDelay) => self.finish_change_delay(&mut session, text).await,
            None => {
                log::debug!("Unprompted text from {}, ignoring", chat_id);
                Ok(())
            }
        }
    }

    async fn finish_add_word(&self, session: &mut UserSession, text: &str) -> AppResult<()> {
        let result = self.add_word(session, text).await;
        session.unlock();
        session.resume_sender();

        let reply = match result {
            Ok(message) => message,
            Err(e) => self.add_word_error(e),
        };
        self.sender.clean_chat(session).await;
        self.reply(session, reply).await?;
        let menu = self.menu_screen(session);
        self.reply(session, menu).await
    }

    /// Validates, translates and stores a word. Returns the confirmation.
    async fn add_word(&self, session: &mut UserSession, text: &str) -> AppResult<OutgoingMessage> {
        let word = session.vocabulary().check_new_word(text)?;
        let translations = self.translator.translate(&word).await?;
        let entry = session.vocabulary().prepare_entry(&word, translations)?;

        let mut args = FluentArgs::new();
        args.set("word", entry.word.clone());
        args.set("translations", entry.translations.join(", "));

        session.add_word(self.store.as_ref(), entry)?;
        Ok(screens::text_args(&self.lang, "add-added", &args))
    }

    fn add_word_error(&self, error: AppError) -> OutgoingMessage {
        let mut args = FluentArgs::new();
        match error {
            AppError::Validation(_) => screens::text(&self.lang, "add-invalid"),
            AppError::WordExists(word) => {
                args.set("word", word);
                screens::text_args(&self.lang, "add-exists", &args)
            }
            AppError::VocabularyFull { max } => {
                args.set("max", max);
                screens::text_args(&self.lang, "add-full", &args)
            }
            AppError::TranslationNotFound(word) => {
                args.set("word", word);
                screens::text_args(&self.lang, "add-not-found", &args)
            }
            AppError::TranslationLookupFailed(reason) => {
                log::warn!("Translation lookup failed: {}", reason);
                screens::text(&self.lang, "add-lookup-failed")
            }
            other => {
                log::error!("Failed to add word: {}", other);
                screens::text(&self.lang, "error-generic")
            }
        }
    }

    async fn finish_change_delay(&self, session: &mut UserSession, text: &str) -> AppResult<()> {
        let result = parse_delay(text).and_then(|minutes| {
            session.set_delay(self.store.as_ref(), minutes)?;
            Ok(minutes)
        });
        session.unlock();
        session.resume_sender();

        let mut args = FluentArgs::new();
        let reply = match result {
            Ok(minutes) => {
                log::info!("User {} set delay to {} min", session.chat_id(), minutes);
                args.set("minutes", minutes);
                screens::text_args(&self.lang, "delay-updated", &args)
            }
            Err(AppError::Validation(_)) => {
                args.set("min", schedule::MIN_DELAY_MINUTES);
                args.set("max", schedule::MAX_DELAY_MINUTES);
                screens::text_args(&self.lang, "delay-invalid", &args)
            }
            Err(e) => {
                log::error!("Failed to change delay for {}: {}", session.chat_id(), e);
                screens::text(&self.lang, "error-generic")
            }
        };
        self.sender.clean_chat(session).await;
        self.reply(session, reply).await?;
        let menu = self.menu_screen(session);
        self.reply(session, menu).await
    }

    // --- buttons ---

    pub async fn on_callback(&self, chat_id: i64, action: CallbackAction) -> AppResult<()> {
        let Some(shared) = self.sessions.get(chat_id) else {
            log::warn!("Callback {} from unknown chat {}", action, chat_id);
            return Ok(());
        };
        let mut session = shared.lock().await;

        match action {
            CallbackAction::Answer(index) => self.answer_quiz(&mut session, index).await,
            CallbackAction::Word(_) => Ok(()),
            _ if self.ignore_while_locked(&session) => Ok(()),
            CallbackAction::Menu(item) => self.menu_item(&shared, &mut session, item).await,
            CallbackAction::Page(range) => self.show_page(&mut session, range).await,
            CallbackAction::Delete { word, page } => self.delete_word(&mut session, &word, page).await,
            CallbackAction::BackToMenu => self.show_menu(&mut session).await,
            CallbackAction::BackToPages => self.show_page_ranges(&mut session).await,
        }
    }

    async fn menu_item(&self, shared: &SharedSession, session: &mut UserSession, item: MenuItem) -> AppResult<()> {
        match item {
            MenuItem::AddWord => {
                self.sender.clean_chat(session).await;
                if session.vocabulary().is_full() {
                    let mut args = FluentArgs::new();
                    args.set("max", vocabulary::MAX_WORDS);
                    self.reply(session, screens::text_args(&self.lang, "add-full", &args))
                        .await?;
                    let menu = self.menu_screen(session);
                    return self.reply(session, menu).await;
                }
                session.pause_sender();
                session.lock(PendingInput::NewWord)?;
                self.reply(session, screens::text(&self.lang, "add-prompt")).await
            }
            MenuItem::ToggleSender => {
                let status = self.toggle_sender(shared, session)?;
                self.sender.clean_chat(session).await;
                self.reply(session, status).await?;
                let menu = self.menu_screen(session);
                self.reply(session, menu).await
            }
            MenuItem::WordList => {
                session.pause_sender();
                self.show_page_ranges(session).await
            }
            MenuItem::ChangeDelay => {
                session.pause_sender();
                session.lock(PendingInput::NewDelay)?;
                let mut args = FluentArgs::new();
                args.set("current", session.delay_minutes());
                self.sender.clean_chat(session).await;
                self.reply(session, screens::text_args(&self.lang, "delay-prompt", &args))
                    .await
            }
            MenuItem::PracticeList => {
                session.pause_sender();
                self.sender.clean_chat(session).await;
                let table = screens::practice_table(&self.lang, session.vocabulary()).with_button(self.back_to_menu());
                self.reply(session, table).await
            }
            MenuItem::Help => {
                self.sender.clean_chat(session).await;
                let help = screens::text(&self.lang, "help-text").with_button(self.back_to_menu());
                self.reply(session, help).await
            }
        }
    }

    fn toggle_sender(&self, shared: &SharedSession, session: &mut UserSession) -> AppResult<OutgoingMessage> {
        let mut args = FluentArgs::new();
        if session.state().is_sender_active() {
            self.sender.deactivate(session)?;
            return Ok(screens::text(&self.lang, "sender-deactivated"));
        }
        match self.sender.activate(shared, session) {
            Ok(()) => {
                args.set("minutes", session.delay_minutes());
                Ok(screens::text_args(&self.lang, "sender-activated", &args))
            }
            Err(AppError::InsufficientVocabulary { have, need }) => {
                args.set("have", have);
                args.set("need", need);
                Ok(screens::text_args(&self.lang, "sender-need-words", &args))
            }
            Err(e) => Err(e),
        }
    }

    async fn answer_quiz(&self, session: &mut UserSession, index: usize) -> AppResult<()> {
        self.sender.clean_chat(session).await;
        let Some(quiz) = session.take_current_quiz() else {
            return self
                .reply(session, screens::text(&self.lang, "quiz-expired"))
                .await;
        };

        let mut args = FluentArgs::new();
        let mut text = if quiz.is_correct(index) {
            i18n::t(&self.lang, "quiz-correct")
        } else {
            args.set("answer", quiz.correct.clone());
            i18n::t_args(&self.lang, "quiz-wrong", &args)
        };
        log::info!(
            "User {} answered '{}': {}",
            session.chat_id(),
            quiz.word,
            if quiz.is_correct(index) { "correct" } else { "wrong" }
        );

        if session.state().is_sender_active() {
            let mut next = FluentArgs::new();
            next.set("minutes", session.delay_minutes());
            text.push('\n');
            text.push_str(&i18n::t_args(&self.lang, "quiz-next", &next));
        }

        session.resume_sender();
        self.reply(session, OutgoingMessage::text(text)).await
    }

    async fn delete_word(&self, session: &mut UserSession, word: &str, page: PageRange) -> AppResult<()> {
        let mut args = FluentArgs::new();
        args.set("word", word.to_string());

        let notices = match session.delete_word(self.store.as_ref(), word) {
            Ok(outcome) => {
                let mut notices = vec![screens::text_args(&self.lang, "words-deleted", &args)];
                if outcome.sender_stopped {
                    let mut min = FluentArgs::new();
                    min.set("min", vocabulary::MIN_WORDS);
                    notices.push(screens::text_args(&self.lang, "words-auto-off", &min));
                }
                notices
            }
            Err(AppError::WordNotFound(_)) => vec![screens::text_args(&self.lang, "words-not-found", &args)],
            Err(e) => {
                log::error!("Failed to delete '{}' for {}: {}", word, session.chat_id(), e);
                vec![screens::text(&self.lang, "error-generic")]
            }
        };

        self.sender.clean_chat(session).await;
        for notice in notices {
            self.reply(session, notice).await?;
        }
        self.reply_page(session, page).await
    }

    // --- screens ---

    async fn show_menu(&self, session: &mut UserSession) -> AppResult<()> {
        // The menu replaces any unanswered quiz, whose message is deleted below
        if session.take_current_quiz().is_some() {
            log::debug!("Discarding unanswered quiz for {}", session.chat_id());
        }
        session.resume_sender();
        self.sender.clean_chat(session).await;
        let menu = self.menu_screen(session);
        self.reply(session, menu).await
    }

    async fn show_page_ranges(&self, session: &mut UserSession) -> AppResult<()> {
        self.sender.clean_chat(session).await;
        let screen = screens::page_ranges(&self.lang, session.vocabulary());
        self.reply(session, screen).await
    }

    async fn show_page(&self, session: &mut UserSession, range: PageRange) -> AppResult<()> {
        self.sender.clean_chat(session).await;
        self.reply_page(session, range).await
    }

    /// The page's words, or the range list when the page has emptied.
    async fn reply_page(&self, session: &mut UserSession, range: PageRange) -> AppResult<()> {
        let screen = if session.vocabulary().page(range).is_empty() {
            screens::page_ranges(&self.lang, session.vocabulary())
        } else {
            screens::page_words(&self.lang, session.vocabulary(), range)
        };
        self.reply(session, screen).await
    }

    fn menu_screen(&self, session: &UserSession) -> OutgoingMessage {
        screens::main_menu(&self.lang, session.state().is_sender_active())
    }

    fn back_to_menu(&self) -> Button {
        Button::new(i18n::t(&self.lang, "words-back-menu"), CallbackAction::BackToMenu)
    }

    async fn reply(&self, session: &mut UserSession, message: OutgoingMessage) -> AppResult<()> {
        let sent = self.transport.send(session.chat_id(), message).await?;
        session.track_message(sent);
        Ok(())
    }

    fn ignore_while_locked(&self, session: &UserSession) -> bool {
        match session.state().ensure_idle() {
            Ok(()) => false,
            Err(e) => {
                log::debug!("Ignoring action from {}: {}", session.chat_id(), e);
                true
            }
        }
    }

    // --- lifecycle ---

    /// Stops every timer and clears the bot's messages from all chats.
    pub async fn shutdown(&self) {
        self.sender.close_all(&self.sessions).await;
        for shared in self.sessions.all() {
            let mut session = shared.lock().await;
            self.sender.clean_chat(&mut session).await;
        }
        log::info!("Conversation shut down");
    }
}

fn track(session: &mut UserSession, message: Option<MessageRef>) {
    if let Some(id) = message {
        session.track_message(id);
    }
}
