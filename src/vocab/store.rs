//! Per-user word list.
//!
//! Words are kept in a `BTreeMap` so browsing and pagination see them in
//! lexicographic order without sorting on every request.

use std::collections::BTreeMap;

use crate::core::config::vocabulary;
use crate::core::error::{AppError, AppResult};
use crate::core::validation::normalize_word;

/// One word in a user's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// Lowercase English word, unique within the list
    pub word: String,
    /// Known translations, lookup order, no duplicates, never empty
    pub translations: Vec<String>,
    /// How many quizzes have been sent for this word
    pub usage_count: u32,
}

impl VocabularyEntry {
    pub fn new(word: impl Into<String>, translations: Vec<String>) -> Self {
        Self {
            word: word.into(),
            translations: dedupe_translations(translations),
            usage_count: 0,
        }
    }

    /// Selection weight: words quizzed less often come up more often.
    ///
    /// `1 / (1 + usage_count)` is strictly positive for every count.
    pub fn weight(&self) -> f64 {
        1.0 / (1.0 + f64::from(self.usage_count))
    }
}

/// A contiguous slice of the sorted word list shown as one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Trims translations, drops empty ones and repeats, keeps the first-seen order.
pub fn dedupe_translations(translations: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(translations.len());
    for t in translations {
        let t = t.trim();
        if !t.is_empty() && !unique.iter().any(|u| u == t) {
            unique.push(t.to_string());
        }
    }
    unique
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: BTreeMap<String, VocabularyEntry>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored entries. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.word.clone(), e)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&VocabularyEntry> {
        self.entries.get(word)
    }

    /// Entries in word order.
    pub fn entries(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.entries.values()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= vocabulary::MAX_WORDS
    }

    /// Checks whether `input` could be added, before any translation lookup.
    ///
    /// Returns the normalized word.
    pub fn check_new_word(&self, input: &str) -> AppResult<String> {
        let word = normalize_word(input)?;
        if self.contains(&word) {
            return Err(AppError::WordExists(word));
        }
        if self.is_full() {
            return Err(AppError::VocabularyFull {
                max: vocabulary::MAX_WORDS,
            });
        }
        Ok(word)
    }

    /// Builds the entry `add` would insert, without touching the list.
    ///
    /// Lets callers persist the entry first and only then `insert` it.
    pub fn prepare_entry(&self, input: &str, translations: Vec<String>) -> AppResult<VocabularyEntry> {
        let word = self.check_new_word(input)?;
        let entry = VocabularyEntry::new(word, translations);
        if entry.translations.is_empty() {
            return Err(AppError::TranslationNotFound(entry.word));
        }
        Ok(entry)
    }

    /// Inserts an entry produced by `prepare_entry`.
    pub fn insert(&mut self, entry: VocabularyEntry) {
        self.entries.insert(entry.word.clone(), entry);
    }

    pub fn add(&mut self, word: &str, translations: Vec<String>) -> AppResult<&VocabularyEntry> {
        let entry = self.prepare_entry(word, translations)?;
        let key = entry.word.clone();
        self.insert(entry);
        self.entries.get(&key).ok_or(AppError::WordNotFound(key))
    }

    pub fn delete(&mut self, word: &str) -> AppResult<VocabularyEntry> {
        self.entries
            .remove(word)
            .ok_or_else(|| AppError::WordNotFound(word.to_string()))
    }

    /// Counts one more quiz for `word`. Returns false if the word is absent.
    pub fn increase_usage(&mut self, word: &str) -> bool {
        match self.entries.get_mut(word) {
            Some(entry) => {
                entry.usage_count = entry.usage_count.saturating_add(1);
                true
            }
            None => {
                log::warn!("increase_usage called for unknown word '{}'", word);
                false
            }
        }
    }

    pub fn sorted_words(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Words with their selection weights, in word order.
    pub fn words_and_weights(&self) -> (Vec<&str>, Vec<f64>) {
        self.entries.values().map(|e| (e.word.as_str(), e.weight())).unzip()
    }

    /// Splits the sorted list into pages of `per_page` words.
    pub fn page_ranges(&self, per_page: usize) -> Vec<PageRange> {
        let total = self.entries.len();
        let per_page = per_page.max(1);
        (0..total)
            .step_by(per_page)
            .map(|start| PageRange::new(start, (start + per_page).min(total)))
            .collect()
    }

    /// Words inside `range`, clamped to the current list.
    pub fn page(&self, range: PageRange) -> Vec<&str> {
        let words = self.sorted_words();
        let end = range.end.min(words.len());
        let start = range.start.min(end);
        words[start..end].to_vec()
    }

    /// Button label for a page: first letters of its first and last word, e.g. `a-c`.
    pub fn page_label(&self, range: PageRange) -> String {
        let words = self.page(range);
        let initial = |w: Option<&&str>| w.and_then(|w| w.chars().next()).map(String::from).unwrap_or_default();
        format!("{}-{}", initial(words.first()), initial(words.last()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tr(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vocabulary {
        let mut v = Vocabulary::new();
        v.add("cat", tr(&["חתול"])).unwrap();
        v.add("dog", tr(&["כלב"])).unwrap();
        v.add("sun", tr(&["שמש"])).unwrap();
        v.add("moon", tr(&["ירח"])).unwrap();
        v
    }

    #[test]
    fn test_add_normalizes_and_stores() {
        let mut v = Vocabulary::new();
        let entry = v.add("  Apple ", tr(&["תפוח", "תפוח", " "])).unwrap();
        assert_eq!(entry.word, "apple");
        assert_eq!(entry.translations, tr(&["תפוח"]));
        assert_eq!(entry.usage_count, 0);
        assert!(v.contains("apple"));
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut v = sample();
        assert!(matches!(v.add("cat", tr(&["x"])), Err(AppError::WordExists(w)) if w == "cat"));
        assert!(matches!(v.add("CAT", tr(&["x"])), Err(AppError::WordExists(_))));
    }

    #[test]
    fn test_add_rejects_invalid_word() {
        let mut v = Vocabulary::new();
        assert!(matches!(v.add("hello1", tr(&["x"])), Err(AppError::Validation(_))));
        assert!(matches!(v.add("", tr(&["x"])), Err(AppError::Validation(_))));
        assert!(v.is_empty());
    }

    #[test]
    fn test_add_rejects_empty_translations() {
        let mut v = Vocabulary::new();
        let err = v.add("ghost", vec![]).unwrap_err();
        assert!(matches!(err, AppError::TranslationNotFound(w) if w == "ghost"));
        assert!(v.is_empty());
    }

    #[test]
    fn test_add_rejects_when_full() {
        let mut v = Vocabulary::new();
        let letters: Vec<char> = ('a'..='z').collect();
        let mut n = 0;
        'outer: for a in &letters {
            for b in &letters {
                if n == vocabulary::MAX_WORDS {
                    break 'outer;
                }
                v.add(&format!("{}{}", a, b), tr(&["x"])).unwrap();
                n += 1;
            }
        }
        assert_eq!(v.len(), vocabulary::MAX_WORDS);
        assert!(matches!(
            v.add("overflow", tr(&["x"])),
            Err(AppError::VocabularyFull { max: 100 })
        ));
    }

    #[test]
    fn test_add_then_delete_round_trip() {
        let mut v = sample();
        let before = v.clone();
        v.add("star", tr(&["כוכב"])).unwrap();
        assert_eq!(v.len(), 5);
        v.delete("star").unwrap();
        assert_eq!(v, before);
    }

    #[test]
    fn test_delete_missing_word() {
        let mut v = sample();
        assert!(matches!(v.delete("zebra"), Err(AppError::WordNotFound(_))));
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_increase_usage() {
        let mut v = sample();
        assert!(v.increase_usage("cat"));
        assert!(v.increase_usage("cat"));
        assert_eq!(v.get("cat").unwrap().usage_count, 2);
        assert!(!v.increase_usage("zebra"));
    }

    #[test]
    fn test_sorted_words() {
        let v = sample();
        assert_eq!(v.sorted_words(), vec!["cat", "dog", "moon", "sun"]);
    }

    #[test]
    fn test_weights_positive_and_decreasing() {
        let mut v = sample();
        for _ in 0..5 {
            v.increase_usage("dog");
        }
        let (words, weights) = v.words_and_weights();
        assert_eq!(words.len(), weights.len());
        assert!(weights.iter().all(|w| *w > 0.0));

        let cat = v.get("cat").unwrap().weight();
        let dog = v.get("dog").unwrap().weight();
        assert_eq!(cat, 1.0);
        assert!(dog < cat);
    }

    #[test]
    fn test_weight_never_zero_at_max_usage() {
        let mut entry = VocabularyEntry::new("cat", tr(&["חתול"]));
        entry.usage_count = u32::MAX;
        assert!(entry.weight() > 0.0);
    }

    #[test]
    fn test_page_ranges() {
        let mut v = Vocabulary::new();
        for i in 0..45u8 {
            let word = format!("{}{}", (b'a' + i / 26) as char, (b'a' + i % 26) as char);
            v.add(&word, tr(&["x"])).unwrap();
        }
        let ranges = v.page_ranges(20);
        assert_eq!(
            ranges,
            vec![PageRange::new(0, 20), PageRange::new(20, 40), PageRange::new(40, 45)]
        );
        assert_eq!(v.page(ranges[2]).len(), 5);
    }

    #[test]
    fn test_page_ranges_empty_and_exact() {
        assert!(Vocabulary::new().page_ranges(20).is_empty());

        let v = sample();
        assert_eq!(v.page_ranges(4), vec![PageRange::new(0, 4)]);
        assert_eq!(v.page_ranges(2), vec![PageRange::new(0, 2), PageRange::new(2, 4)]);
    }

    #[test]
    fn test_page_clamps_stale_range() {
        let v = sample();
        assert_eq!(v.page(PageRange::new(2, 20)), vec!["moon", "sun"]);
        assert!(v.page(PageRange::new(10, 20)).is_empty());
    }

    #[test]
    fn test_page_label() {
        let v = sample();
        assert_eq!(v.page_label(PageRange::new(0, 4)), "c-s");
        assert_eq!(v.page_label(PageRange::new(0, 1)), "c-c");
    }
}
