use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::evaluate::{evaluate_mc, evaluate_writing, Feedback};
use crate::exercise::{generate_mc, generate_writing, McExercise, WritingExercise};
use crate::score::{ScoreAccumulator, SessionResults};
use crate::vocabulary::{draw, VocabularyItem, VocabularySource};

/// Words per session when the caller does not ask for a positive number.
pub const DEFAULT_WORD_COUNT: usize = 10;

pub fn effective_word_count(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => DEFAULT_WORD_COUNT,
    }
}

/// Stages of a session, in the only order they can be visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Learning,
    MultipleChoice,
    Writing,
    Results,
}

impl Phase {
    /// The phase that follows this one. `Results` is terminal; only a
    /// restart leaves it.
    pub fn next(self) -> Phase {
        match self {
            Phase::Idle => Phase::Learning,
            Phase::Learning => Phase::MultipleChoice,
            Phase::MultipleChoice => Phase::Writing,
            Phase::Writing => Phase::Results,
            Phase::Results => Phase::Results,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub vocabulary: Vec<VocabularyItem>,
    pub mc_exercises: Vec<McExercise>,
    pub writing_exercises: Vec<WritingExercise>,
    pub learning_index: usize,
    pub mc_index: usize,
    pub writing_index: usize,
    pub score: ScoreAccumulator,
    /// The quiz item under `mc_index`/`writing_index` has been scored.
    pub answered: bool,
}

/// Everything a screen needs to draw the current step.
///
/// `position` is zero-based; `total` is the length of the phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionView {
    Idle,
    Learning {
        item: VocabularyItem,
        position: usize,
        total: usize,
    },
    MultipleChoice {
        exercise: McExercise,
        position: usize,
        total: usize,
    },
    Writing {
        exercise: WritingExercise,
        position: usize,
        total: usize,
    },
    Results(SessionResults),
}

impl SessionView {
    pub fn phase(&self) -> Phase {
        match self {
            SessionView::Idle => Phase::Idle,
            SessionView::Learning { .. } => Phase::Learning,
            SessionView::MultipleChoice { .. } => Phase::MultipleChoice,
            SessionView::Writing { .. } => Phase::Writing,
            SessionView::Results(_) => Phase::Results,
        }
    }
}

/// Drives one learner through a session.
///
/// The machine owns its random source so exercise generation can be made
/// reproducible by seeding it.
#[derive(Debug)]
pub struct SessionMachine<R = StdRng> {
    state: SessionState,
    rng: R,
}

impl SessionMachine<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SessionMachine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SessionMachine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: SessionState::default(),
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.state.score
    }

    /// Whether the current quiz item has already been answered.
    pub fn is_answered(&self) -> bool {
        self.state.answered
    }

    /// Starts a new session over the first `requested` words.
    ///
    /// Any running session is discarded first, so a failure leaves the
    /// machine idle and empty.
    pub fn start_session(
        &mut self,
        mut vocabulary: Vec<VocabularyItem>,
        requested: Option<usize>,
    ) -> Result<SessionView> {
        self.restart();
        vocabulary.truncate(effective_word_count(requested));
        if vocabulary.is_empty() {
            warn!("refusing to start a session without vocabulary");
            return Err(SessionError::EmptyVocabulary);
        }

        let mc_exercises = generate_mc(&vocabulary, &mut self.rng);
        let writing_exercises = generate_writing(&vocabulary);
        self.start_prepared(vocabulary, mc_exercises, writing_exercises)
    }

    /// Resets, then draws `requested` random words from `source` and starts.
    ///
    /// Source errors are passed through unchanged and leave the machine idle.
    pub fn start_session_from<S: VocabularySource + ?Sized>(
        &mut self,
        source: &mut S,
        requested: Option<usize>,
    ) -> Result<SessionView> {
        self.restart();
        let count = effective_word_count(requested);
        let vocabulary = draw(source, count, &mut self.rng).map_err(|err| {
            warn!(error = %err, "vocabulary source failed");
            err
        })?;
        self.start_session(vocabulary, Some(count))
    }

    /// Starts a session over exercises built elsewhere.
    ///
    /// Exercise lists may be shorter than the vocabulary, or empty; empty
    /// phases are skipped.
    pub fn start_prepared(
        &mut self,
        vocabulary: Vec<VocabularyItem>,
        mc_exercises: Vec<McExercise>,
        writing_exercises: Vec<WritingExercise>,
    ) -> Result<SessionView> {
        self.restart();
        if vocabulary.is_empty() {
            return Err(SessionError::EmptyVocabulary);
        }

        info!(
            words = vocabulary.len(),
            mc = mc_exercises.len(),
            writing = writing_exercises.len(),
            "session started"
        );
        self.state.vocabulary = vocabulary;
        self.state.mc_exercises = mc_exercises;
        self.state.writing_exercises = writing_exercises;
        self.enter_phase_after(Phase::Idle);
        Ok(self.current_view())
    }

    pub fn advance_learning(&mut self) -> Result<SessionView> {
        self.expect_phase(Phase::Learning, "advance_learning")?;
        self.state.learning_index += 1;
        if self.state.learning_index >= self.state.vocabulary.len() {
            self.enter_phase_after(Phase::Learning);
        }
        Ok(self.current_view())
    }

    /// Scores the selection. The index does not move; call
    /// [`advance_mc`](Self::advance_mc) for that.
    pub fn submit_mc_answer(&mut self, selected: &str) -> Result<Feedback> {
        self.expect_unanswered(Phase::MultipleChoice, "submit_mc_answer")?;
        let exercise = &self.state.mc_exercises[self.state.mc_index];
        let correct = evaluate_mc(selected, exercise);
        let feedback = Feedback {
            correct,
            correct_answer: exercise.correct_answer.clone(),
        };

        self.state.score.record_mc(correct);
        self.state.answered = true;
        debug!(index = self.state.mc_index, correct, "multiple-choice answer");
        Ok(feedback)
    }

    pub fn advance_mc(&mut self) -> Result<SessionView> {
        self.expect_phase(Phase::MultipleChoice, "advance_mc")?;
        self.state.mc_index += 1;
        self.state.answered = false;
        if self.state.mc_index >= self.state.mc_exercises.len() {
            self.enter_phase_after(Phase::MultipleChoice);
        }
        Ok(self.current_view())
    }

    pub fn submit_writing_answer(&mut self, input: &str) -> Result<Feedback> {
        self.expect_unanswered(Phase::Writing, "submit_writing_answer")?;
        let exercise = &self.state.writing_exercises[self.state.writing_index];
        let correct = evaluate_writing(input, exercise);
        let feedback = Feedback {
            correct,
            correct_answer: exercise.correct_answer.clone(),
        };

        self.state.score.record_writing(correct);
        self.state.answered = true;
        debug!(index = self.state.writing_index, correct, "writing answer");
        Ok(feedback)
    }

    pub fn advance_writing(&mut self) -> Result<SessionView> {
        self.expect_phase(Phase::Writing, "advance_writing")?;
        self.state.writing_index += 1;
        self.state.answered = false;
        if self.state.writing_index >= self.state.writing_exercises.len() {
            self.enter_phase_after(Phase::Writing);
        }
        Ok(self.current_view())
    }

    pub fn results(&self) -> Result<SessionResults> {
        self.expect_phase(Phase::Results, "results")?;
        Ok(self.summary())
    }

    /// Drops all session data and returns to `Idle`.
    pub fn restart(&mut self) -> SessionView {
        if self.state.phase != Phase::Idle {
            debug!(from = %self.state.phase, "session restarted");
        }
        self.state = SessionState::default();
        SessionView::Idle
    }

    pub fn current_view(&self) -> SessionView {
        let state = &self.state;
        match state.phase {
            Phase::Idle => SessionView::Idle,
            Phase::Learning => SessionView::Learning {
                item: state.vocabulary[state.learning_index].clone(),
                position: state.learning_index,
                total: state.vocabulary.len(),
            },
            Phase::MultipleChoice => SessionView::MultipleChoice {
                exercise: state.mc_exercises[state.mc_index].clone(),
                position: state.mc_index,
                total: state.mc_exercises.len(),
            },
            Phase::Writing => SessionView::Writing {
                exercise: state.writing_exercises[state.writing_index].clone(),
                position: state.writing_index,
                total: state.writing_exercises.len(),
            },
            Phase::Results => SessionView::Results(self.summary()),
        }
    }

    fn summary(&self) -> SessionResults {
        SessionResults {
            word_count: self.state.vocabulary.len(),
            mc_correct: self.state.score.mc_correct(),
            mc_total: self.state.mc_exercises.len(),
            writing_correct: self.state.score.writing_correct(),
            writing_total: self.state.writing_exercises.len(),
        }
    }

    fn has_items(&self, phase: Phase) -> bool {
        match phase {
            Phase::Learning => !self.state.vocabulary.is_empty(),
            Phase::MultipleChoice => !self.state.mc_exercises.is_empty(),
            Phase::Writing => !self.state.writing_exercises.is_empty(),
            Phase::Idle | Phase::Results => true,
        }
    }

    /// Moves past `finished`, skipping every phase that has nothing to show.
    fn enter_phase_after(&mut self, finished: Phase) {
        let mut next = finished.next();
        while !self.has_items(next) {
            debug!(phase = %next, "skipping empty phase");
            next = next.next();
        }

        debug!(from = %self.state.phase, to = %next, "phase transition");
        self.state.phase = next;
        self.state.answered = false;
        if next == Phase::Results {
            info!(results = ?self.summary(), "session finished");
        }
    }

    fn expect_phase(&self, phase: Phase, operation: &'static str) -> Result<()> {
        if self.state.phase == phase {
            return Ok(());
        }
        warn!(operation, phase = %self.state.phase, "invalid state transition");
        Err(SessionError::InvalidStateTransition {
            operation,
            phase: self.state.phase,
        })
    }

    /// Each quiz item can be scored once.
    fn expect_unanswered(&self, phase: Phase, operation: &'static str) -> Result<()> {
        self.expect_phase(phase, operation)?;
        if self.state.answered {
            warn!(operation, "item already answered");
            return Err(SessionError::InvalidStateTransition {
                operation,
                phase: self.state.phase,
            });
        }
        Ok(())
    }
}
