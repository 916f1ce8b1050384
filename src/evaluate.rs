use serde::Serialize;

use crate::exercise::{McExercise, WritingExercise};

/// Verdict for a submitted answer, with the answer so callers can reveal it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub correct: bool,
    pub correct_answer: String,
}

/// Options are offered verbatim, so the selection must match exactly.
pub fn evaluate_mc(selected: &str, exercise: &McExercise) -> bool {
    selected == exercise.correct_answer
}

/// Trims the input and ignores case. Nothing else is forgiven: a missing
/// article, a typo or a different accent is wrong.
pub fn evaluate_writing(input: &str, exercise: &WritingExercise) -> bool {
    input.trim().to_lowercase() == exercise.correct_answer.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writing(answer: &str) -> WritingExercise {
        WritingExercise {
            prompt: "the house".into(),
            correct_answer: answer.into(),
        }
    }

    #[test]
    fn mc_requires_exact_match() {
        let exercise = McExercise {
            prompt_sentence: "______ ist groß".into(),
            options: vec!["das Haus".into(), "der Hund".into()],
            correct_answer: "das Haus".into(),
        };
        assert!(evaluate_mc("das Haus", &exercise));
        assert!(!evaluate_mc("Das Haus", &exercise));
        assert!(!evaluate_mc("der Hund", &exercise));
        assert!(!evaluate_mc(" das Haus", &exercise));
    }

    #[test]
    fn writing_ignores_case_and_surrounding_whitespace() {
        assert!(evaluate_writing(" Haus ", &writing("Haus")));
        assert!(evaluate_writing("haus", &writing("Haus")));
        assert!(evaluate_writing("DAS HAUS", &writing("das Haus")));
        assert!(evaluate_writing("\tdie straße\n", &writing("die Straße")));
    }

    #[test]
    fn writing_rejects_other_differences() {
        assert!(!evaluate_writing("Hauss", &writing("Haus")));
        assert!(!evaluate_writing("Haus", &writing("das Haus")));
        assert!(!evaluate_writing("die Strasse", &writing("die Straße")));
        assert!(!evaluate_writing("uber", &writing("über")));
        assert!(!evaluate_writing("das  Haus", &writing("das Haus")));
        assert!(!evaluate_writing("", &writing("Haus")));
    }
}
