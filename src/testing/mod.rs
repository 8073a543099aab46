//! In-memory doubles for the bot's external seams
//!
//! Used by unit tests and by the integration tests under `tests/`:
//! - `MemoryStore`: a `WordStore` kept in a map, with switchable write failures
//! - `RecordingTransport`: a `Transport` that records every message
//! - `StaticTranslator`: a `Translator` answering from a fixed table

pub mod memory;
pub mod recorder;

pub use memory::{MemoryStore, StaticTranslator};
pub use recorder::RecordingTransport;
