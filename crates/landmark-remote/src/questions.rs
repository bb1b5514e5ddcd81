//! HTTP question source.
//!
//! One POST of `{ "package_name": ... }` to the question endpoint; the
//! response is `{ "questions": [ { question, option_a..option_d,
//! correct_answer, area } ] }`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use landmark_core::error::FetchError;
use landmark_core::model::QuestionRecord;
use landmark_core::traits::QuestionSource;

pub const DEFAULT_QUESTIONS_URL: &str =
    "https://twwgbdwnrsntinfhpplr.supabase.co/functions/v1/questions";
pub const DEFAULT_PACKAGE_NAME: &str = "com.cavelabspesurr.chestsounds";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches question records from the remote question service.
pub struct HttpQuestionSource {
    endpoint: String,
    package_name: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuestionSource {
    pub fn new(endpoint: &str, package_name: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            package_name: package_name.to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct QuestionsRequest<'a> {
    package_name: &'a str,
}

#[derive(Deserialize)]
struct QuestionsResponse {
    questions: Vec<QuestionRecord>,
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint, package = %self.package_name))]
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
        let body = QuestionsRequest {
            package_name: &self.package_name,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout_secs)
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let parsed: QuestionsResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(parsed.questions)
    }
}
