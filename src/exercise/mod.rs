pub mod blank;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::vocabulary::VocabularyItem;

pub use blank::{blank_sentence, BLANK, FILL_IN_HINT, SENTENCE_FALLBACK};

/// Upper bound on the options offered per multiple-choice item.
pub const MAX_OPTIONS: usize = 4;

/// Writing prompt used when an item has no English text.
pub const TRANSLATION_FALLBACK: &str = "Translation unavailable";

/// Pick the German term that fills the blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McExercise {
    pub prompt_sentence: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Type the German term for an English prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingExercise {
    pub prompt: String,
    pub correct_answer: String,
}

/// One multiple-choice exercise per item, in vocabulary order.
///
/// Distractors are sampled without replacement from the distinct German terms
/// of the other items, and the options are shuffled so the answer's position
/// carries no information. All randomness is drawn from `rng`.
pub fn generate_mc<R: Rng + ?Sized>(vocabulary: &[VocabularyItem], rng: &mut R) -> Vec<McExercise> {
    let exercises: Vec<McExercise> = vocabulary
        .iter()
        .map(|item| McExercise {
            prompt_sentence: blank_sentence(item.sample_sentence.as_deref(), &item.german),
            options: options_for(&item.german, vocabulary, &mut *rng),
            correct_answer: item.german.clone(),
        })
        .collect();

    debug!(count = exercises.len(), "generated multiple-choice exercises");
    exercises
}

fn options_for<R: Rng + ?Sized>(correct: &str, vocabulary: &[VocabularyItem], rng: &mut R) -> Vec<String> {
    let distractors: Vec<&str> = vocabulary
        .iter()
        .map(|v| v.german.as_str())
        .filter(|german| *german != correct)
        .unique()
        .collect();

    let mut options = vec![correct.to_string()];
    options.extend(
        distractors
            .choose_multiple(rng, MAX_OPTIONS - 1)
            .map(|german| german.to_string()),
    );
    options.shuffle(rng);
    options
}

/// One writing exercise per item, in vocabulary order.
pub fn generate_writing(vocabulary: &[VocabularyItem]) -> Vec<WritingExercise> {
    vocabulary
        .iter()
        .map(|item| WritingExercise {
            prompt: if item.english.is_empty() {
                TRANSLATION_FALLBACK.to_string()
            } else {
                item.english.clone()
            },
            correct_answer: item.german.clone(),
        })
        .collect()
}
