//! Error types for the assessment core.
//!
//! None of these are fatal to a session: fetch failures fall back to the
//! default questions, rejected events are ignored, and a missing question
//! degrades to a placeholder.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Landmark, Phase};

/// Errors from the one-shot question bank fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The service answered with a non-2xx status.
    #[error("question service error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("failed to parse question response: {0}")]
    Parse(String),
}

/// Errors from delivering a session report.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// No upload endpoint was configured.
    #[error("upload endpoint is not configured")]
    NotConfigured,

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The upload endpoint answered with a non-2xx status.
    #[error("upload rejected (HTTP {status}): {body}")]
    Status { status: u16, body: String },
}

/// An inbound event the state machine refused. State is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventRejected {
    #[error("session has ended")]
    SessionEnded,

    #[error("{event} event is not expected while {phase}")]
    UnexpectedEvent { phase: Phase, event: &'static str },
}

/// Neither the remote bank nor the defaults hold a question for a landmark.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no question available for {landmark}")]
pub struct EmptyQuestionError {
    pub landmark: Landmark,
}

/// Errors from loading or validating a landmark catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog defines no landmarks")]
    Empty,

    #[error("duplicate landmark: {0}")]
    DuplicateLandmark(String),

    #[error("invalid default question for {landmark}: {reason}")]
    InvalidQuestion { landmark: String, reason: String },

    #[error("classification labels for {0} must differ")]
    InvalidClassification(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_name_phase_and_event() {
        let err = EventRejected::UnexpectedEvent {
            phase: Phase::AwaitingMcq,
            event: "landmark reached",
        };
        assert_eq!(
            err.to_string(),
            "landmark reached event is not expected while awaiting MCQ answer"
        );
    }

    #[test]
    fn fetch_status_message_includes_code() {
        let err = FetchError::Status {
            status: 503,
            body: "down".into(),
        };
        assert!(err.to_string().contains("503"));
    }
}
