//! Transport that records every interaction instead of talking to Telegram

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chat::transport::{MessageRef, OutgoingMessage, Transport};
use crate::core::error::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, MessageRef, OutgoingMessage)>>,
    deleted: Mutex<Vec<(i64, MessageRef)>>,
    next_id: AtomicI32,
    fail: AtomicBool,
}

impl RecordingTransport {
    /// While set, `send` fails as if the user had blocked the bot.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered to `chat_id`, oldest first.
    pub fn sent_to(&self, chat_id: i64) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(chat, _, _)| *chat == chat_id)
            .map(|(_, _, msg)| msg.clone())
            .collect()
    }

    pub fn last_sent(&self, chat_id: i64) -> Option<OutgoingMessage> {
        self.sent_to(chat_id).pop()
    }

    /// References of the messages delivered to `chat_id`, oldest first.
    pub fn sent_refs(&self, chat_id: i64) -> Vec<MessageRef> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(chat, _, _)| *chat == chat_id)
            .map(|(_, id, _)| *id)
            .collect()
    }

    pub fn deleted(&self, chat_id: i64) -> Vec<MessageRef> {
        self.deleted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Allocates a reference as if the user had sent a message.
    pub fn next_ref(&self) -> MessageRef {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> AppResult<MessageRef> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Telegram(teloxide::RequestError::Api(
                teloxide::ApiError::BotBlocked,
            )));
        }
        let id = self.next_ref();
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((chat_id, id, message));
        Ok(id)
    }

    async fn delete_messages(&self, chat_id: i64, refs: &[MessageRef]) -> AppResult<()> {
        self.deleted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(refs.iter().map(|id| (chat_id, *id)));
        Ok(())
    }
}
