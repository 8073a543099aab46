use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: lexibot.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "lexibot.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: lexibot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "lexibot.log".to_string()));

/// Language of bot screens ("he" or "en")
/// Read from BOT_LANGUAGE environment variable
/// Default: he
pub static BOT_LANGUAGE: Lazy<String> = Lazy::new(|| env::var("BOT_LANGUAGE").unwrap_or_else(|_| "he".to_string()));

/// Limits on a user's word list
pub mod vocabulary {
    /// Sender can only be switched on with at least this many words
    pub const MIN_WORDS: usize = 4;

    /// Adding is refused once the list holds this many words
    pub const MAX_WORDS: usize = 100;

    /// Words must be strictly shorter than this (in characters)
    pub const MAX_WORD_LEN: usize = 46;

    /// Words shown per page in the word browser
    pub const WORDS_PER_PAGE: usize = 20;

    /// Number of wrong options shown next to the correct translation
    pub const DISTRACTORS: usize = 3;
}

/// Word sender timing
pub mod schedule {
    use super::Duration;

    /// Shortest allowed delay between quizzes (minutes)
    pub const MIN_DELAY_MINUTES: u32 = 1;

    /// Longest allowed delay between quizzes (minutes, 24 hours)
    pub const MAX_DELAY_MINUTES: u32 = 24 * 60;

    /// Delay given to newly registered users
    pub const DEFAULT_DELAY_MINUTES: u32 = 60;

    /// Converts a delay in minutes into the timer period
    pub fn period(delay_minutes: u32) -> Duration {
        Duration::from_secs(u64::from(delay_minutes) * 60)
    }
}

/// Translation lookup service
pub mod translate {
    use super::{env, Duration, Lazy};

    /// Base URL of a MyMemory-compatible translation API
    /// Read from TRANSLATE_API_URL environment variable
    pub static API_URL: Lazy<String> = Lazy::new(|| {
        env::var("TRANSLATE_API_URL").unwrap_or_else(|_| "https://api.mymemory.translated.net".to_string())
    });

    /// Source and target languages, `en|he` by default
    pub static LANG_PAIR: Lazy<String> =
        Lazy::new(|| env::var("TRANSLATE_LANG_PAIR").unwrap_or_else(|_| "en|he".to_string()));

    /// Request timeout in seconds
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("TRANSLATE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8)
    });

    /// Maximum number of translations kept per word
    pub const MAX_TRANSLATIONS: usize = 5;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }
}

/// Telegram network configuration
pub mod network {
    use super::Duration;

    /// HTTP client timeout for Bot API requests (seconds)
    pub const TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_bounds() {
        assert_eq!(schedule::MIN_DELAY_MINUTES, 1);
        assert_eq!(schedule::MAX_DELAY_MINUTES, 1440);
        assert!(schedule::DEFAULT_DELAY_MINUTES >= schedule::MIN_DELAY_MINUTES);
        assert!(schedule::DEFAULT_DELAY_MINUTES <= schedule::MAX_DELAY_MINUTES);
    }

    #[test]
    fn test_period_is_in_minutes() {
        assert_eq!(schedule::period(1), Duration::from_secs(60));
        assert_eq!(schedule::period(1440), Duration::from_secs(86_400));
    }

    #[test]
    fn test_word_limits() {
        assert!(vocabulary::MIN_WORDS <= vocabulary::MAX_WORDS);
        assert_eq!(vocabulary::MIN_WORDS, vocabulary::DISTRACTORS + 1);
    }
}
