//! Presenter implementations that do not render anything themselves.

use std::sync::{Mutex, PoisonError};

use crate::traits::Presenter;

/// A signal emitted to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    DisplayText(String),
    ShowOptions(Vec<String>),
    HideOptions,
    Feedback(bool),
    EndExperience,
}

/// Drops every signal.
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn display_text(&self, _: &str) {}
    fn show_options(&self, _: &[String]) {}
    fn hide_options(&self) {}
    fn play_feedback(&self, _: bool) {}
    fn end_experience(&self) {}
}

/// Records every signal in order, for tests and replays.
#[derive(Default)]
pub struct RecordingPresenter {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, signal: Signal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }

    /// Snapshot of all signals so far.
    pub fn signals(&self) -> Vec<Signal> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent displayed text.
    pub fn last_text(&self) -> Option<String> {
        self.signals().into_iter().rev().find_map(|s| match s {
            Signal::DisplayText(text) => Some(text),
            _ => None,
        })
    }

    /// The most recently shown option list.
    pub fn last_options(&self) -> Option<Vec<String>> {
        self.signals().into_iter().rev().find_map(|s| match s {
            Signal::ShowOptions(options) => Some(options),
            _ => None,
        })
    }

    pub fn count(&self, wanted: &Signal) -> usize {
        self.signals().iter().filter(|s| *s == wanted).count()
    }
}

impl Presenter for RecordingPresenter {
    fn display_text(&self, message: &str) {
        self.push(Signal::DisplayText(message.to_string()));
    }

    fn show_options(&self, options: &[String]) {
        self.push(Signal::ShowOptions(options.to_vec()));
    }

    fn hide_options(&self) {
        self.push(Signal::HideOptions);
    }

    fn play_feedback(&self, correct: bool) {
        self.push(Signal::Feedback(correct));
    }

    fn end_experience(&self) {
        self.push(Signal::EndExperience);
    }
}
