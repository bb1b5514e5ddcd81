//! Running score and ordered step log.

use serde::Serialize;

use crate::model::StepOutcome;

/// Append-only log of step outcomes with a running score.
///
/// Each correct outcome adds one point; nothing ever subtracts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreLog {
    score: u32,
    steps: Vec<StepOutcome>,
}

impl ScoreLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome and return a reference to the stored record.
    pub fn record(&mut self, outcome: StepOutcome) -> &StepOutcome {
        if outcome.is_correct() {
            self.score = self.score.saturating_add(1);
        }
        self.steps.push(outcome);
        &self.steps[self.steps.len() - 1]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn incorrect_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_correct()).count()
    }
}
