//! Builders for every screen the bot shows.

use fluent_templates::fluent_bundle::FluentArgs;
use unic_langid::LanguageIdentifier;

use crate::chat::callback::{CallbackAction, MenuItem};
use crate::chat::transport::{Button, OutgoingMessage};
use crate::core::config::vocabulary::WORDS_PER_PAGE;
use crate::i18n;
use crate::vocab::{PageRange, Quiz, Vocabulary};

pub fn text(lang: &LanguageIdentifier, key: &str) -> OutgoingMessage {
    OutgoingMessage::text(i18n::t(lang, key))
}

pub fn text_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> OutgoingMessage {
    OutgoingMessage::text(i18n::t_args(lang, key, args))
}

pub fn main_menu(lang: &LanguageIdentifier, sender_active: bool) -> OutgoingMessage {
    let item = |key: &str, item: MenuItem| Button::new(i18n::t(lang, key), CallbackAction::Menu(item));
    let toggle_key = if sender_active {
        "menu-sender-off"
    } else {
        "menu-sender-on"
    };

    OutgoingMessage::text(i18n::t(lang, "menu-title"))
        .with_button(item("menu-add-word", MenuItem::AddWord))
        .with_button(item(toggle_key, MenuItem::ToggleSender))
        .with_button(item("menu-word-list", MenuItem::WordList))
        .with_button(item("menu-change-delay", MenuItem::ChangeDelay))
        .with_button(item("menu-practice-list", MenuItem::PracticeList))
        .with_button(item("menu-help", MenuItem::Help))
}

/// The question with one button per option, in shuffled order.
pub fn quiz(lang: &LanguageIdentifier, quiz: &Quiz) -> OutgoingMessage {
    let mut args = FluentArgs::new();
    args.set("word", quiz.word.clone());

    quiz.options
        .iter()
        .enumerate()
        .fold(
            OutgoingMessage::text(i18n::t_args(lang, "quiz-question", &args)),
            |msg, (index, option)| msg.with_button(Button::new(option.clone(), CallbackAction::Answer(index))),
        )
}

/// Page range buttons, two per row, plus a way back to the menu.
pub fn page_ranges(lang: &LanguageIdentifier, vocabulary: &Vocabulary) -> OutgoingMessage {
    let back = Button::new(i18n::t(lang, "words-back-menu"), CallbackAction::BackToMenu);

    if vocabulary.is_empty() {
        return text(lang, "words-empty").with_button(back);
    }

    let buttons: Vec<Button> = vocabulary
        .page_ranges(WORDS_PER_PAGE)
        .into_iter()
        .map(|range| Button::new(vocabulary.page_label(range), CallbackAction::Page(range)))
        .collect();

    buttons
        .chunks(2)
        .fold(text(lang, "words-pick-range"), |msg, row| msg.with_row(row.to_vec()))
        .with_button(back)
}

/// Words of one page, each with a delete button.
pub fn page_words(lang: &LanguageIdentifier, vocabulary: &Vocabulary, range: PageRange) -> OutgoingMessage {
    let mut args = FluentArgs::new();
    args.set("label", vocabulary.page_label(range));
    let delete_label = i18n::t(lang, "words-delete-button");

    vocabulary
        .page(range)
        .into_iter()
        .fold(text_args(lang, "words-page-title", &args), |msg, word| {
            msg.with_row(vec![
                Button::new(word, CallbackAction::Word(word.to_string())),
                Button::new(
                    delete_label.clone(),
                    CallbackAction::Delete {
                        word: word.to_string(),
                        page: range,
                    },
                ),
            ])
        })
        .with_row(vec![
            Button::new(i18n::t(lang, "words-back-pages"), CallbackAction::BackToPages),
            Button::new(i18n::t(lang, "words-back-menu"), CallbackAction::BackToMenu),
        ])
}

/// `word - t1/t2` per line.
pub fn practice_table(lang: &LanguageIdentifier, vocabulary: &Vocabulary) -> OutgoingMessage {
    if vocabulary.is_empty() {
        return text(lang, "practice-empty");
    }
    let rows: Vec<String> = vocabulary
        .entries()
        .map(|e| format!("{} - {}", e.word, e.translations.join("/")))
        .collect();
    OutgoingMessage::monospace(format!("{}\n\n{}", i18n::t(lang, "practice-title"), rows.join("\n")))
}

/// `word - usage_count` per line.
pub fn priorities_table(lang: &LanguageIdentifier, vocabulary: &Vocabulary) -> OutgoingMessage {
    if vocabulary.is_empty() {
        return text(lang, "priorities-empty");
    }
    let width = vocabulary.entries().map(|e| e.word.len()).max().unwrap_or(0);
    let rows: Vec<String> = vocabulary
        .entries()
        .map(|e| format!("{:width$} - {}", e.word, e.usage_count, width = width))
        .collect();
    OutgoingMessage::monospace(format!("{}\n\n{}", i18n::t(lang, "priorities-title"), rows.join("\n")))
}
