//! Mock collaborators for testing sessions without a network.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use landmark_core::error::{FetchError, UploadError};
use landmark_core::model::QuestionRecord;
use landmark_core::report::SessionReport;
use landmark_core::traits::{QuestionSource, SessionUploader};

/// A question source that serves a fixed record list or a fixed failure.
pub struct MockQuestionSource {
    result: Result<Vec<QuestionRecord>, FetchError>,
    call_count: AtomicU32,
}

impl MockQuestionSource {
    pub fn with_records(records: Vec<QuestionRecord>) -> Self {
        Self {
            result: Ok(records),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of fetches made against this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionSource for MockQuestionSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.result.clone()
    }
}

/// An uploader that keeps every report it receives.
#[derive(Default)]
pub struct MockUploader {
    reports: Mutex<Vec<SessionReport>>,
    fail_with: Option<UploadError>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record reports but answer every upload with `error`.
    pub fn failing(error: UploadError) -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    pub fn call_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn reports(&self) -> Vec<SessionReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionUploader for MockUploader {
    async fn upload(&self, report: &SessionReport) -> Result<(), UploadError> {
        self.reports.lock().unwrap().push(report.clone());
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
