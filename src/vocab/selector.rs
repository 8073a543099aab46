//! Quiz selection.
//!
//! The target word is drawn with usage-based weights, so rarely quizzed words
//! come up more often. Three other words supply the wrong options.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::store::Vocabulary;
use crate::core::config::vocabulary::DISTRACTORS;
use crate::core::error::{AppError, AppResult};

/// A question ready to be sent: one word and four shuffled translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub word: String,
    pub correct: String,
    /// Correct translation plus distractors, in presentation order.
    /// Distractor texts may repeat.
    pub options: Vec<String>,
}

impl Quiz {
    /// Whether the option at `index` is the right answer.
    ///
    /// Compares text, so a distractor that happens to spell the correct
    /// translation also counts as right.
    pub fn is_correct(&self, index: usize) -> bool {
        self.options.get(index).is_some_and(|o| *o == self.correct)
    }
}

/// Picks a word and builds its quiz.
///
/// Does not touch usage counters: the caller increments usage only after the
/// quiz was delivered.
///
/// # Errors
/// `InsufficientVocabulary` when fewer than four words are available.
pub fn select_quiz<R: Rng + ?Sized>(vocabulary: &Vocabulary, rng: &mut R) -> AppResult<Quiz> {
    let need = DISTRACTORS + 1;
    if vocabulary.len() < need {
        return Err(AppError::InsufficientVocabulary {
            have: vocabulary.len(),
            need,
        });
    }

    let (words, weights) = vocabulary.words_and_weights();
    let dist = WeightedIndex::new(&weights).map_err(|e| {
        log::error!("Invalid selection weights {:?}: {}", weights, e);
        AppError::InsufficientVocabulary {
            have: words.len(),
            need,
        }
    })?;
    let target = words[dist.sample(rng)];

    let correct = pick_translation(vocabulary, target, rng)?;

    let pool: Vec<&str> = words.iter().copied().filter(|w| *w != target).collect();
    if pool.len() < DISTRACTORS {
        return Err(AppError::InsufficientVocabulary {
            have: pool.len() + 1,
            need,
        });
    }

    let mut options = Vec::with_capacity(need);
    for word in pool.choose_multiple(rng, DISTRACTORS) {
        options.push(pick_translation(vocabulary, word, rng)?);
    }
    options.push(correct.clone());
    options.shuffle(rng);

    Ok(Quiz {
        word: target.to_string(),
        correct,
        options,
    })
}

fn pick_translation<R: Rng + ?Sized>(vocabulary: &Vocabulary, word: &str, rng: &mut R) -> AppResult<String> {
    vocabulary
        .get(word)
        .and_then(|e| e.translations.choose(rng))
        .cloned()
        .ok_or_else(|| AppError::TranslationNotFound(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::store::VocabularyEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tr(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scenario() -> Vocabulary {
        Vocabulary::from_entries(vec![
            VocabularyEntry::new("cat", tr(&["חתול"])),
            VocabularyEntry::new("dog", tr(&["כלב"])),
            VocabularyEntry::new("sun", tr(&["שמש"])),
            VocabularyEntry::new("moon", tr(&["ירח"])),
        ])
    }

    #[test]
    fn test_scenario_four_words() {
        let vocab = scenario();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let quiz = select_quiz(&vocab, &mut rng).unwrap();
            let entry = vocab.get(&quiz.word).expect("target must come from the vocabulary");
            assert!(entry.translations.contains(&quiz.correct));
            assert_eq!(quiz.options.len(), 4);
            assert_eq!(quiz.options.iter().filter(|o| **o == quiz.correct).count(), 1);

            // The three others are exactly the other words' translations.
            let mut distractors: Vec<&String> = quiz.options.iter().filter(|o| **o != quiz.correct).collect();
            let mut expected: Vec<&String> = vocab
                .entries()
                .filter(|e| e.word != quiz.word)
                .map(|e| &e.translations[0])
                .collect();
            distractors.sort();
            expected.sort();
            assert_eq!(distractors, expected);
        }
    }

    #[test]
    fn test_options_contain_correct_for_larger_lists() {
        let mut vocab = Vocabulary::new();
        for (i, word) in ["ant", "bee", "cow", "doe", "eel", "fox", "gnu", "hen"].iter().enumerate() {
            vocab
                .add(word, vec![format!("t{}a", i), format!("t{}b", i)])
                .unwrap();
        }
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let quiz = select_quiz(&vocab, &mut rng).unwrap();
            assert_eq!(quiz.options.len(), 4);
            assert!(quiz.options.contains(&quiz.correct));
            let idx = quiz.options.iter().position(|o| *o == quiz.correct).unwrap();
            assert!(quiz.is_correct(idx));
        }
    }

    #[test]
    fn test_insufficient_vocabulary() {
        let mut vocab = scenario();
        vocab.delete("moon").unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let err = select_quiz(&vocab, &mut rng).unwrap_err();
        assert!(matches!(err, AppError::InsufficientVocabulary { have: 3, need: 4 }));
    }

    #[test]
    fn test_selection_does_not_change_usage() {
        let vocab = scenario();
        let mut rng = StdRng::seed_from_u64(3);
        let _ = select_quiz(&vocab, &mut rng).unwrap();
        assert!(vocab.entries().all(|e| e.usage_count == 0));
    }

    #[test]
    fn test_low_usage_selected_more_often() {
        let mut vocab = scenario();
        for _ in 0..50 {
            vocab.increase_usage("dog");
        }
        let mut rng = StdRng::seed_from_u64(2024);

        let mut cat = 0;
        let mut dog = 0;
        for _ in 0..4000 {
            match select_quiz(&vocab, &mut rng).unwrap().word.as_str() {
                "cat" => cat += 1,
                "dog" => dog += 1,
                _ => {}
            }
        }
        assert!(cat > dog, "cat={} dog={}", cat, dog);
        assert!(cat > 10 * dog, "cat={} dog={}", cat, dog);
    }

    #[test]
    fn test_is_correct_out_of_range() {
        let quiz = Quiz {
            word: "cat".into(),
            correct: "חתול".into(),
            options: tr(&["כלב", "חתול", "שמש", "ירח"]),
        };
        assert!(quiz.is_correct(1));
        assert!(!quiz.is_correct(0));
        assert!(!quiz.is_correct(9));
    }
}
