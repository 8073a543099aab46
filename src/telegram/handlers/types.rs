//! Handler types and dependencies

use crate::chat::Conversation;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub conversation: Conversation,
}

impl HandlerDeps {
    pub fn new(conversation: Conversation) -> Self {
        Self { conversation }
    }
}
