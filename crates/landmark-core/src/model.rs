//! Core data model types for landmark assessment.
//!
//! These are the fundamental types the session controller works with:
//! landmarks, questions, classification labels, step outcomes, phases,
//! and the inbound events from the sensor layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named anatomical landmark the learner must physically locate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmark(String);

impl Landmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Landmark {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A multiple-choice question about a landmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the learner.
    pub text: String,
    /// The option that scores the point.
    pub correct_answer: String,
    /// Answer options, in authoring order.
    pub options: Vec<String>,
}

/// Number of options every well-formed question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

const PLACEHOLDER_TEXT: &str = "No question";

impl Question {
    pub fn new(
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            text: text.into(),
            correct_answer: correct_answer.into(),
            options,
        }
    }

    /// Neutral stand-in used when no remote or default question exists.
    ///
    /// It has no options, so the learner has nothing meaningful to pick.
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER_TEXT.to_string(),
            correct_answer: String::new(),
            options: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.options.is_empty() && self.correct_answer.is_empty()
    }

    /// Check the question shape: four distinct options that include the
    /// correct answer. Returns a human-readable reason on failure.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is empty".into());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {OPTIONS_PER_QUESTION} options, found {}",
                self.options.len()
            ));
        }
        for (i, opt) in self.options.iter().enumerate() {
            if self.options[..i].contains(opt) {
                return Err(format!("duplicate option: {opt}"));
            }
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(format!(
                "correct answer '{}' is not among the options",
                self.correct_answer
            ));
        }
        Ok(())
    }
}

/// The binary labels offered in the classification phase for a landmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOptions {
    /// The label that scores the point.
    pub expected: String,
    /// The distractor label.
    pub other: String,
}

impl ClassificationOptions {
    pub fn new(expected: impl Into<String>, other: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            other: other.into(),
        }
    }

    /// Labels in presentation order (expected first).
    pub fn labels(&self) -> Vec<String> {
        vec![self.expected.clone(), self.other.clone()]
    }

    /// Prompt shown while the classification phase is active.
    pub fn prompt(&self, landmark: &Landmark) -> String {
        format!("Is the {landmark} {} or {}?", self.expected, self.other)
    }
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        Self::new("Normal", "Abnormal")
    }
}

/// Whether a resolved step was answered correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepStatus {
    Correct,
    Incorrect,
}

impl StepStatus {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            StepStatus::Correct
        } else {
            StepStatus::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, StepStatus::Correct)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Correct => write!(f, "Correct"),
            StepStatus::Incorrect => write!(f, "Incorrect"),
        }
    }
}

/// Which phase produced a step outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Location,
    Classification,
    Mcq,
}

/// Immutable record of one resolved phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Step label, e.g. "Locate Trachea" or "MCQ: <question>".
    pub name: String,
    pub kind: StepKind,
    pub status: StepStatus,
    /// Seconds since the step's phase became active.
    pub elapsed_seconds: f64,
    pub correct_answer: String,
    pub selected_answer: String,
}

impl StepOutcome {
    pub fn is_correct(&self) -> bool {
        self.status.is_correct()
    }
}

/// The phase a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    AwaitingLocation,
    AwaitingClassification,
    AwaitingMcq,
    SessionEnded,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingLocation => write!(f, "awaiting location"),
            Phase::AwaitingClassification => write!(f, "awaiting classification"),
            Phase::AwaitingMcq => write!(f, "awaiting MCQ answer"),
            Phase::SessionEnded => write!(f, "session ended"),
        }
    }
}

/// Inbound events from the sensor layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The learner's hand entered a landmark's trigger volume.
    LandmarkReached(String),
    /// The learner pressed an option button.
    OptionChosen(String),
}

impl SessionEvent {
    /// Short label for logs and rejection messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::LandmarkReached(_) => "landmark reached",
            SessionEvent::OptionChosen(_) => "option chosen",
        }
    }
}

/// A question record as published by the remote question service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    /// Landmark name this question belongs to.
    pub area: String,
}

impl QuestionRecord {
    /// Split the record into its landmark and question.
    pub fn into_question(self) -> (Landmark, Question) {
        let question = Question::new(
            self.question,
            self.correct_answer,
            vec![self.option_a, self.option_b, self.option_c, self.option_d],
        );
        (Landmark::new(self.area), question)
    }
}
