//! `Transport` implementation on top of the Telegram Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::utils::markdown;

use crate::chat::transport::{Button, MessageRef, OutgoingMessage, Transport};
use crate::core::error::AppResult;
use crate::telegram::Bot;

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> AppResult<MessageRef> {
        let text = if message.monospace {
            markdown::code_block(&message.text)
        } else {
            message.text.clone()
        };

        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if message.monospace {
            request = request.parse_mode(ParseMode::MarkdownV2);
        }
        if !message.buttons.is_empty() {
            request = request.reply_markup(keyboard(&message.buttons));
        }

        let sent = request.await?;
        Ok(sent.id.0)
    }

    async fn delete_messages(&self, chat_id: i64, refs: &[MessageRef]) -> AppResult<()> {
        for id in refs {
            if let Err(e) = self.bot.delete_message(ChatId(chat_id), MessageId(*id)).await {
                log::debug!("Could not delete message {} in chat {}: {}", id, chat_id, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::callback::{CallbackAction, MenuItem};
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_keyboard_encodes_actions() {
        let rows = vec![
            vec![Button::new("Add", CallbackAction::Menu(MenuItem::AddWord))],
            vec![
                Button::new("a", CallbackAction::Answer(0)),
                Button::new("b", CallbackAction::Answer(1)),
            ],
        ];
        let markup = keyboard(&rows);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "menu:add"),
            other => panic!("unexpected button kind: {:?}", other),
        }
    }
}
