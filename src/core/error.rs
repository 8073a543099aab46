use thiserror::Error;

/// Centralized error types for the application
///
/// Every fallible operation in the bot returns this enum. Variants are split
/// between user-facing outcomes (validation, vocabulary limits, translation
/// misses) that the interaction layer turns into a reply, and infrastructure
/// failures (database, Telegram, HTTP) that are logged.
///
/// # Example
///
/// ```no_run
/// use lexibot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad user input: word format, delay value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not enough words for a quiz or for switching the sender on
    #[error("Not enough words: have {have}, need {need}")]
    InsufficientVocabulary { have: usize, need: usize },

    /// Word list already holds the maximum number of words
    #[error("Word list is full ({max} words)")]
    VocabularyFull { max: usize },

    /// Word is already in the user's list
    #[error("Word already exists: {0}")]
    WordExists(String),

    /// Word is not in the user's list
    #[error("Word not found: {0}")]
    WordNotFound(String),

    /// Lookup succeeded but returned no translations
    #[error("No translation found for: {0}")]
    TranslationNotFound(String),

    /// Lookup service itself failed
    #[error("Translation lookup failed: {0}")]
    TranslationLookupFailed(String),

    /// Session is waiting for free-text input
    #[error("Session is locked awaiting input")]
    SessionLocked,

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// Whether the error came from the persistence layer.
    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::DatabasePool(_))
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
