//! User input validation
//!
//! - New words: English letters and spaces only, shorter than 46 characters
//! - Delay values: whole minutes between 1 and 1440

use crate::core::config::{schedule, vocabulary};
use crate::core::error::{AppError, AppResult};

/// Normalizes and validates a word typed by the user.
///
/// The word is trimmed and lowercased before checking. Inner spaces are
/// allowed so phrases like "ice cream" can be stored.
///
/// # Examples
/// ```
/// use lexibot::core::validation::normalize_word;
///
/// assert_eq!(normalize_word("  Hello ").unwrap(), "hello");
/// assert!(normalize_word("hello1").is_err());
/// ```
pub fn normalize_word(input: &str) -> AppResult<String> {
    let word = input.trim().to_lowercase();

    if word.is_empty() {
        return Err(AppError::Validation("word is empty".to_string()));
    }

    if !word.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(AppError::Validation(format!(
            "'{}' must contain only English letters and spaces",
            word
        )));
    }

    if word.len() >= vocabulary::MAX_WORD_LEN {
        return Err(AppError::Validation(format!(
            "word must be shorter than {} characters",
            vocabulary::MAX_WORD_LEN
        )));
    }

    Ok(word)
}

/// Parses a delay in minutes typed by the user.
///
/// # Examples
/// ```
/// use lexibot::core::validation::parse_delay;
///
/// assert_eq!(parse_delay("30").unwrap(), 30);
/// assert!(parse_delay("1500").is_err());
/// ```
pub fn parse_delay(input: &str) -> AppResult<u32> {
    let text = input.trim();

    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!("'{}' is not a whole number", text)));
    }

    let minutes: u32 = text
        .parse()
        .map_err(|_| AppError::Validation(format!("'{}' is too large", text)))?;

    validate_delay(minutes)?;
    Ok(minutes)
}

/// Checks that a delay lies in the allowed range.
pub fn validate_delay(minutes: u32) -> AppResult<()> {
    if !(schedule::MIN_DELAY_MINUTES..=schedule::MAX_DELAY_MINUTES).contains(&minutes) {
        return Err(AppError::Validation(format!(
            "delay must be between {} and {} minutes",
            schedule::MIN_DELAY_MINUTES,
            schedule::MAX_DELAY_MINUTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word_valid() {
        assert_eq!(normalize_word("cat").unwrap(), "cat");
        assert_eq!(normalize_word("Dog").unwrap(), "dog");
        assert_eq!(normalize_word("ice cream").unwrap(), "ice cream");
        assert_eq!(normalize_word("  Moon\n").unwrap(), "moon");
    }

    #[test]
    fn test_normalize_word_rejects_digits() {
        let err = normalize_word("hello1").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_normalize_word_rejects_punctuation_and_empty() {
        assert!(normalize_word("don't").is_err());
        assert!(normalize_word("שלום").is_err());
        assert!(normalize_word("").is_err());
        assert!(normalize_word("   ").is_err());
    }

    #[test]
    fn test_normalize_word_length_limit() {
        let ok = "a".repeat(45);
        let too_long = "a".repeat(46);
        assert!(normalize_word(&ok).is_ok());
        assert!(matches!(normalize_word(&too_long), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_delay_valid() {
        assert_eq!(parse_delay("1").unwrap(), 1);
        assert_eq!(parse_delay(" 90 ").unwrap(), 90);
        assert_eq!(parse_delay("1440").unwrap(), 1440);
    }

    #[test]
    fn test_parse_delay_rejects_out_of_range() {
        assert!(matches!(parse_delay("1500"), Err(AppError::Validation(_))));
        assert!(matches!(parse_delay("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_delay("99999999999999"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_delay_rejects_non_numeric() {
        assert!(parse_delay("ten").is_err());
        assert!(parse_delay("-5").is_err());
        assert!(parse_delay("1.5").is_err());
        assert!(parse_delay("").is_err());
    }
}
