use serde::Serialize;

/// Running tally of correct answers for the two quiz phases.
///
/// Counters only ever move up, and only by one per correct verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreAccumulator {
    mc_correct: usize,
    writing_correct: usize,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mc(&mut self, correct: bool) {
        if correct {
            self.mc_correct += 1;
        }
    }

    pub fn record_writing(&mut self, correct: bool) {
        if correct {
            self.writing_correct += 1;
        }
    }

    pub fn mc_correct(&self) -> usize {
        self.mc_correct
    }

    pub fn writing_correct(&self) -> usize {
        self.writing_correct
    }
}

/// Summary shown when a session reaches the results phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResults {
    pub word_count: usize,
    pub mc_correct: usize,
    pub mc_total: usize,
    pub writing_correct: usize,
    pub writing_total: usize,
}

impl SessionResults {
    pub fn mc_percentage(&self) -> Option<f64> {
        crate::util::percentage(self.mc_correct, self.mc_total)
    }

    pub fn writing_percentage(&self) -> Option<f64> {
        crate::util::percentage(self.writing_correct, self.writing_total)
    }

    /// Every quiz answer was right.
    pub fn is_perfect(&self) -> bool {
        self.mc_correct == self.mc_total && self.writing_correct == self.writing_total
    }
}
