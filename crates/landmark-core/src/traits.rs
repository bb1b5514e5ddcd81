//! Collaborator traits at the edges of the session controller.
//!
//! `QuestionSource` and `SessionUploader` are implemented over HTTP by the
//! `landmark-remote` crate. `Presenter` is implemented by whatever renders
//! the session (a headset scene, the CLI console, a test recorder).

use async_trait::async_trait;

use crate::error::{FetchError, UploadError};
use crate::model::QuestionRecord;
use crate::report::SessionReport;

// ---------------------------------------------------------------------------
// Remote collaborators
// ---------------------------------------------------------------------------

/// Source of remote question records.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Fetch every published question record.
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError>;
}

/// Receives the finished session report.
#[async_trait]
pub trait SessionUploader: Send + Sync {
    async fn upload(&self, report: &SessionReport) -> Result<(), UploadError>;
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Outbound display and feedback signals.
pub trait Presenter: Send + Sync {
    fn display_text(&self, message: &str);

    /// Show up to four option buttons.
    fn show_options(&self, options: &[String]);

    fn hide_options(&self);

    fn play_feedback(&self, correct: bool);

    /// The host should close the experience.
    fn end_experience(&self);
}
