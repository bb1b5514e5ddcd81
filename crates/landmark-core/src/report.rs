//! Session report types, JSON persistence, and the end-of-session reporter.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::{StepOutcome, StepStatus};
use crate::scoring::ScoreLog;
use crate::traits::{Presenter, SessionUploader};

/// Default pause between reporting and asking the host to close.
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_secs(5);

/// One step as it appears in the uploaded summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    /// Seconds since the step's phase became active.
    pub time: f64,
    pub correct_answer: String,
    pub selected_answer: String,
}

impl From<&StepOutcome> for StepRecord {
    fn from(outcome: &StepOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            status: outcome.status,
            time: outcome.elapsed_seconds,
            correct_answer: outcome.correct_answer.clone(),
            selected_answer: outcome.selected_answer.clone(),
        }
    }
}

/// A frozen summary of a finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// Wall-clock session start.
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub score: u32,
    /// `3 × number of known landmarks`.
    pub max_score: u32,
    pub total_time_seconds: f64,
}

/// The body handed to the upload collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload<'a> {
    pub steps: &'a [StepRecord],
    pub score: u32,
    pub total_time_seconds: f64,
}

impl SessionReport {
    pub fn new(
        started_at: DateTime<Utc>,
        log: &ScoreLog,
        max_score: u32,
        total_time: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            steps: log.steps().iter().map(StepRecord::from).collect(),
            score: log.score(),
            max_score,
            total_time_seconds: total_time.as_secs_f64(),
        }
    }

    pub fn upload_payload(&self) -> UploadPayload<'_> {
        UploadPayload {
            steps: &self.steps,
            score: self.score,
            total_time_seconds: self.total_time_seconds,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Hands the finished report to the uploader and schedules host teardown.
///
/// Fires at most once. Upload outcome never feeds back into the session.
pub struct SessionReporter {
    uploader: Option<Arc<dyn SessionUploader>>,
    presenter: Arc<dyn Presenter>,
    teardown_delay: Duration,
    fired: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionReporter {
    pub fn new(
        uploader: Option<Arc<dyn SessionUploader>>,
        presenter: Arc<dyn Presenter>,
        teardown_delay: Duration,
    ) -> Self {
        Self {
            uploader,
            presenter,
            teardown_delay,
            fired: false,
            tasks: Vec::new(),
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Start the upload and the teardown timer. Returns `false` if the
    /// reporter already fired. Must be called inside a Tokio runtime.
    pub fn report(&mut self, report: &SessionReport) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;

        match &self.uploader {
            Some(uploader) => {
                let uploader = Arc::clone(uploader);
                let report = report.clone();
                self.tasks.push(tokio::spawn(async move {
                    match uploader.upload(&report).await {
                        Ok(()) => info!(report_id = %report.id, "session report uploaded"),
                        Err(e) => {
                            warn!(report_id = %report.id, "session report upload failed: {e}")
                        }
                    }
                }));
            }
            None => info!(report_id = %report.id, "no uploader configured, report kept locally"),
        }

        let presenter = Arc::clone(&self.presenter);
        let delay = self.teardown_delay;
        self.tasks.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.end_experience();
        }));

        true
    }

    /// Wait for the upload and teardown tasks to finish.
    pub async fn settle(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("reporter task failed: {e}");
            }
        }
    }
}
