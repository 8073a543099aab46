//! Inline button payloads.
//!
//! Every button carries one of these actions encoded as a short string
//! (`menu:add`, `ans:2`, `page:20-39`, `del:0-19:cat`, ...). Parsing is
//! strict: unknown or malformed payloads are rejected, never guessed.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::validation::normalize_word;
use crate::vocab::PageRange;

/// Telegram limits callback data to 64 bytes.
pub const MAX_CALLBACK_LEN: usize = 64;

/// Number of answer options in a quiz.
const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddWord,
    ToggleSender,
    WordList,
    ChangeDelay,
    PracticeList,
    Help,
}

impl MenuItem {
    fn as_str(self) -> &'static str {
        match self {
            MenuItem::AddWord => "add",
            MenuItem::ToggleSender => "toggle",
            MenuItem::WordList => "words",
            MenuItem::ChangeDelay => "delay",
            MenuItem::PracticeList => "practice",
            MenuItem::Help => "help",
        }
    }
}

impl FromStr for MenuItem {
    type Err = CallbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(MenuItem::AddWord),
            "toggle" => Ok(MenuItem::ToggleSender),
            "words" => Ok(MenuItem::WordList),
            "delay" => Ok(MenuItem::ChangeDelay),
            "practice" => Ok(MenuItem::PracticeList),
            "help" => Ok(MenuItem::Help),
            other => Err(CallbackParseError::Malformed(format!("menu:{}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Menu(MenuItem),
    /// Quiz answer, index into the shown options.
    Answer(usize),
    /// Show the words of one page range.
    Page(PageRange),
    /// A word label in the list; carries no action.
    Word(String),
    Delete { word: String, page: PageRange },
    BackToMenu,
    BackToPages,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackParseError {
    #[error("Unknown callback payload: {0}")]
    Unknown(String),
    #[error("Malformed callback payload: {0}")]
    Malformed(String),
}

fn parse_range(s: &str) -> Result<PageRange, CallbackParseError> {
    let malformed = || CallbackParseError::Malformed(s.to_string());
    let (start, end) = s.split_once('-').ok_or_else(malformed)?;
    let start: usize = start.parse().map_err(|_| malformed())?;
    let end: usize = end.parse().map_err(|_| malformed())?;
    if start > end {
        return Err(malformed());
    }
    Ok(PageRange::new(start, end))
}

fn parse_word(s: &str) -> Result<String, CallbackParseError> {
    match normalize_word(s) {
        Ok(word) if word == s => Ok(word),
        _ => Err(CallbackParseError::Malformed(s.to_string())),
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::Menu(item) => write!(f, "menu:{}", item.as_str()),
            CallbackAction::Answer(index) => write!(f, "ans:{}", index),
            CallbackAction::Page(range) => write!(f, "page:{}-{}", range.start, range.end),
            CallbackAction::Word(word) => write!(f, "word:{}", word),
            CallbackAction::Delete { word, page } => {
                write!(f, "del:{}-{}:{}", page.start, page.end, word)
            }
            CallbackAction::BackToMenu => write!(f, "back:menu"),
            CallbackAction::BackToPages => write!(f, "back:pages"),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = CallbackParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        if data.len() > MAX_CALLBACK_LEN {
            return Err(CallbackParseError::Malformed(data.to_string()));
        }

        let (prefix, rest) = data
            .split_once(':')
            .ok_or_else(|| CallbackParseError::Unknown(data.to_string()))?;

        match prefix {
            "menu" => rest.parse().map(CallbackAction::Menu),
            "ans" => {
                let index: usize = rest
                    .parse()
                    .map_err(|_| CallbackParseError::Malformed(data.to_string()))?;
                if index >= OPTION_COUNT {
                    return Err(CallbackParseError::Malformed(data.to_string()));
                }
                Ok(CallbackAction::Answer(index))
            }
            "page" => parse_range(rest).map(CallbackAction::Page),
            "word" => parse_word(rest).map(CallbackAction::Word),
            "del" => {
                let (range, word) = rest
                    .split_once(':')
                    .ok_or_else(|| CallbackParseError::Malformed(data.to_string()))?;
                Ok(CallbackAction::Delete {
                    page: parse_range(range)?,
                    word: parse_word(word)?,
                })
            }
            "back" => match rest {
                "menu" => Ok(CallbackAction::BackToMenu),
                "pages" => Ok(CallbackAction::BackToPages),
                _ => Err(CallbackParseError::Malformed(data.to_string())),
            },
            _ => Err(CallbackParseError::Unknown(data.to_string())),
        }
    }
}
