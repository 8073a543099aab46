//! In-memory user sessions backed by the word store

pub mod registry;
pub mod state;
pub mod user;

pub use registry::{SessionManager, SharedSession};
pub use state::{PendingInput, SessionState};
pub use user::{DeleteOutcome, UserSession};
