//! Outgoing message model and the transport seam.
//!
//! The chat layer has no teloxide dependency: screens are built as plain
//! `OutgoingMessage`s and handed to a `Transport`. The Telegram layer
//! implements it; tests use a recording mock.

use async_trait::async_trait;

use crate::chat::callback::CallbackAction;
use crate::core::error::AppResult;

/// Identifier of a delivered message, used for later deletion.
pub type MessageRef = i32;

/// An inline button carrying a typed callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: CallbackAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    /// Render the text as a fixed-width block (tables).
    pub monospace: bool,
    /// Rows of inline buttons, top to bottom.
    pub buttons: Vec<Vec<Button>>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn monospace(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            monospace: true,
            buttons: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.buttons.push(row);
        }
        self
    }

    pub fn with_button(self, button: Button) -> Self {
        self.with_row(vec![button])
    }

    /// All callback actions in display order.
    pub fn actions(&self) -> impl Iterator<Item = &CallbackAction> {
        self.buttons.iter().flatten().map(|b| &b.action)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers a message and returns its reference.
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> AppResult<MessageRef>;

    /// Deletes previously delivered messages. Missing messages are not an error.
    async fn delete_messages(&self, chat_id: i64, refs: &[MessageRef]) -> AppResult<()>;
}
