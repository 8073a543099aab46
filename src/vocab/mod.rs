//! Word lists and quiz selection

pub mod selector;
pub mod store;

pub use selector::{select_quiz, Quiz};
pub use store::{PageRange, Vocabulary, VocabularyEntry};
