//! Chat interaction layer, independent of the Telegram client

pub mod callback;
pub mod flows;
pub mod screens;
pub mod transport;

pub use callback::{CallbackAction, CallbackParseError, MenuItem};
pub use flows::Conversation;
pub use transport::{Button, MessageRef, OutgoingMessage, Transport};
