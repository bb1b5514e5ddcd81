//! The phase state machine: location, then classification, then MCQ, per
//! landmark, until every known landmark is completed.
//!
//! The machine is synchronous and processes one event to completion. The
//! async driver in [`crate::driver`] supplies the question bank and hands
//! the final report to the reporter.
//!
//! Timing: the phase stopwatch restarts whenever a phase becomes active, so
//! every step's `elapsed_seconds` is measured from its own phase entry.
//! Repeated wrong location attempts all measure from the same entry.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::bank::{shuffled_options, QuestionBank};
use crate::catalog::LandmarkCatalog;
use crate::clock::{Clock, Stopwatch};
use crate::error::EventRejected;
use crate::model::{
    ClassificationOptions, Landmark, Phase, Question, SessionEvent, StepKind, StepOutcome,
    StepStatus,
};
use crate::random::RandomSource;
use crate::report::SessionReport;
use crate::scoring::ScoreLog;
use crate::selector::{next_target, Selection};
use crate::traits::Presenter;

/// Phase together with the data that phase works on.
#[derive(Debug, Clone)]
enum ActivePhase {
    Location {
        target: Landmark,
    },
    Classification {
        target: Landmark,
        options: ClassificationOptions,
    },
    Mcq {
        target: Landmark,
        question: Question,
    },
    Ended,
}

impl ActivePhase {
    fn phase(&self) -> Phase {
        match self {
            ActivePhase::Location { .. } => Phase::AwaitingLocation,
            ActivePhase::Classification { .. } => Phase::AwaitingClassification,
            ActivePhase::Mcq { .. } => Phase::AwaitingMcq,
            ActivePhase::Ended => Phase::SessionEnded,
        }
    }
}

/// What one accepted event did.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The step recorded for this event.
    pub outcome: StepOutcome,
    /// Phase after the event.
    pub phase: Phase,
    /// Present exactly once: on the event that ended the session.
    pub report: Option<SessionReport>,
}

/// Owns all mutable session state and sequences the phases.
pub struct SessionStateMachine {
    catalog: Arc<LandmarkCatalog>,
    phase: ActivePhase,
    completed: HashSet<Landmark>,
    log: ScoreLog,
    started_at: DateTime<Utc>,
    session_clock: Stopwatch,
    phase_clock: Stopwatch,
    rng: Box<dyn RandomSource>,
    presenter: Arc<dyn Presenter>,
}

impl SessionStateMachine {
    /// Start a session: hide options, start the session clock, and enter the
    /// first location phase.
    pub fn start(
        catalog: Arc<LandmarkCatalog>,
        clock: &Clock,
        rng: Box<dyn RandomSource>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        presenter.hide_options();

        let mut machine = Self {
            catalog,
            phase: ActivePhase::Ended,
            completed: HashSet::new(),
            log: ScoreLog::new(),
            started_at: Utc::now(),
            session_clock: Stopwatch::start(clock),
            phase_clock: Stopwatch::start(clock),
            rng,
            presenter,
        };

        // A validated catalog is never empty, so this always finds a target.
        if let Selection::Next(target) =
            next_target(&machine.completed, machine.catalog.landmarks(), machine.rng.as_mut())
        {
            machine.enter_location(target);
        }
        info!(landmarks = machine.catalog.len(), "assessment session started");
        machine
    }

    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    /// The landmark to locate. Defined only while awaiting a location.
    pub fn current_target(&self) -> Option<&Landmark> {
        match &self.phase {
            ActivePhase::Location { target } => Some(target),
            _ => None,
        }
    }

    /// The landmark whose cycle is in progress, in any phase but the last.
    pub fn active_landmark(&self) -> Option<&Landmark> {
        match &self.phase {
            ActivePhase::Location { target }
            | ActivePhase::Classification { target, .. }
            | ActivePhase::Mcq { target, .. } => Some(target),
            ActivePhase::Ended => None,
        }
    }

    pub fn current_classification(&self) -> Option<&ClassificationOptions> {
        match &self.phase {
            ActivePhase::Classification { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            ActivePhase::Mcq { question, .. } => Some(question),
            _ => None,
        }
    }

    pub fn completed(&self) -> &HashSet<Landmark> {
        &self.completed
    }

    pub fn log(&self) -> &ScoreLog {
        &self.log
    }

    pub fn score(&self) -> u32 {
        self.log.score()
    }

    pub fn max_score(&self) -> u32 {
        self.catalog.max_score()
    }

    pub fn catalog(&self) -> &LandmarkCatalog {
        &self.catalog
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, ActivePhase::Ended)
    }

    /// Dispatch one inbound event.
    ///
    /// Events of the wrong kind for the current phase, and any event after
    /// the session ended, are rejected without touching state.
    pub fn handle(
        &mut self,
        event: SessionEvent,
        bank: &QuestionBank,
    ) -> Result<Transition, EventRejected> {
        let result = match &event {
            SessionEvent::LandmarkReached(name) => self.landmark_reached(name),
            SessionEvent::OptionChosen(text) => self.option_chosen(text, bank),
        };
        if let Err(rejected) = &result {
            debug!(event = event.kind(), "event ignored: {rejected}");
        }
        result
    }

    /// The learner touched a landmark.
    pub fn landmark_reached(&mut self, name: &str) -> Result<Transition, EventRejected> {
        let target = match &self.phase {
            ActivePhase::Location { target } => target.clone(),
            other => return Err(self.reject(other.phase(), "landmark reached")),
        };

        let correct = name == target.as_str();
        let outcome = self.record(StepOutcome {
            name: format!("Locate {target}"),
            kind: StepKind::Location,
            status: StepStatus::from_correct(correct),
            elapsed_seconds: self.phase_clock.elapsed_secs(),
            correct_answer: target.to_string(),
            selected_answer: name.to_string(),
        });

        if correct {
            let options = self.catalog.classification_for(&target);
            self.presenter.play_feedback(true);
            self.presenter.display_text(&options.prompt(&target));
            self.presenter.show_options(&options.labels());
            self.phase = ActivePhase::Classification { target, options };
            self.phase_clock.restart();
        } else {
            self.presenter.display_text(&format!("Incorrect. Expected {target}"));
            self.presenter.play_feedback(false);
        }

        Ok(self.transition(outcome, None))
    }

    /// The learner pressed an option button.
    pub fn option_chosen(
        &mut self,
        text: &str,
        bank: &QuestionBank,
    ) -> Result<Transition, EventRejected> {
        match &self.phase {
            ActivePhase::Classification { target, options } => {
                let (target, options) = (target.clone(), options.clone());
                Ok(self.classify(text, target, options, bank))
            }
            ActivePhase::Mcq { target, question } => {
                let (target, question) = (target.clone(), question.clone());
                Ok(self.answer_mcq(text, target, question))
            }
            other => Err(self.reject(other.phase(), "option chosen")),
        }
    }

    fn classify(
        &mut self,
        label: &str,
        target: Landmark,
        options: ClassificationOptions,
        bank: &QuestionBank,
    ) -> Transition {
        let correct = label == options.expected;
        let outcome = self.record(StepOutcome {
            name: format!("Classification at {target}"),
            kind: StepKind::Classification,
            status: StepStatus::from_correct(correct),
            elapsed_seconds: self.phase_clock.elapsed_secs(),
            correct_answer: options.expected.clone(),
            selected_answer: label.to_string(),
        });
        self.presenter.play_feedback(correct);

        let question = bank
            .pick(&target, &self.catalog, self.rng.as_mut())
            .unwrap_or_else(|e| {
                warn!("{e}; showing placeholder question");
                Question::placeholder()
            });

        self.presenter.display_text(&question.text);
        let shown = shuffled_options(&question, self.rng.as_mut());
        if shown.is_empty() {
            self.presenter.hide_options();
        } else {
            self.presenter.show_options(&shown);
        }

        self.phase = ActivePhase::Mcq { target, question };
        self.phase_clock.restart();
        self.transition(outcome, None)
    }

    fn answer_mcq(&mut self, text: &str, target: Landmark, question: Question) -> Transition {
        let correct = !question.is_placeholder() && text == question.correct_answer;
        let outcome = self.record(StepOutcome {
            name: format!("MCQ: {}", question.text),
            kind: StepKind::Mcq,
            status: StepStatus::from_correct(correct),
            elapsed_seconds: self.phase_clock.elapsed_secs(),
            correct_answer: question.correct_answer.clone(),
            selected_answer: text.to_string(),
        });

        if correct {
            self.presenter.display_text("Correct Answer!");
        } else {
            self.presenter.display_text(&format!("Wrong. Correct: {}", question.correct_answer));
        }
        self.presenter.play_feedback(correct);
        self.presenter.hide_options();

        self.completed.insert(target);

        let report = match next_target(&self.completed, self.catalog.landmarks(), self.rng.as_mut())
        {
            Selection::Next(next) => {
                self.enter_location(next);
                None
            }
            Selection::SessionComplete => Some(self.finish()),
        };

        self.transition(outcome, report)
    }

    fn enter_location(&mut self, target: Landmark) {
        self.presenter.display_text(&format!("Locate: {target}"));
        debug!(target = %target, "awaiting location");
        self.phase = ActivePhase::Location { target };
        self.phase_clock.restart();
    }

    fn finish(&mut self) -> SessionReport {
        self.phase = ActivePhase::Ended;
        self.session_clock.stop();
        self.phase_clock.stop();

        let score = self.log.score();
        let max = self.catalog.max_score();
        self.presenter.hide_options();
        self.presenter.display_text(&format!("Test Complete\nScore: {score}/{max}"));

        let report = SessionReport::new(
            self.started_at,
            &self.log,
            max,
            self.session_clock.elapsed(),
        );
        info!(
            score,
            max,
            total_secs = report.total_time_seconds,
            "assessment session ended"
        );
        report
    }

    fn record(&mut self, outcome: StepOutcome) -> StepOutcome {
        debug!(step = %outcome.name, status = %outcome.status, "step recorded");
        self.log.record(outcome).clone()
    }

    fn transition(&self, outcome: StepOutcome, report: Option<SessionReport>) -> Transition {
        Transition {
            outcome,
            phase: self.phase(),
            report,
        }
    }

    fn reject(&self, phase: Phase, event: &'static str) -> EventRejected {
        if phase == Phase::SessionEnded {
            EventRejected::SessionEnded
        } else {
            EventRejected::UnexpectedEvent { phase, event }
        }
    }
}
