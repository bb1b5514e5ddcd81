//! HTTP upload collaborator for finished session reports.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use landmark_core::error::UploadError;
use landmark_core::report::{SessionReport, UploadPayload};
use landmark_core::traits::SessionUploader;

/// Posts the session summary to the results endpoint.
///
/// The session code and auth token come from the host environment and are
/// passed through as-is.
pub struct HttpUploader {
    endpoint: String,
    session_code: Option<String>,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(
        endpoint: &str,
        session_code: Option<String>,
        auth_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| UploadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            session_code,
            auth_token,
            client,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_code: Option<&'a str>,
    #[serde(flatten)]
    payload: UploadPayload<'a>,
}

#[async_trait]
impl SessionUploader for HttpUploader {
    #[instrument(skip(self, report), fields(report_id = %report.id, score = report.score))]
    async fn upload(&self, report: &SessionReport) -> Result<(), UploadError> {
        if self.endpoint.trim().is_empty() {
            return Err(UploadError::NotConfigured);
        }

        let body = UploadBody {
            session_code: self.session_code.as_deref(),
            payload: report.upload_payload(),
        };

        let mut req = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json");

        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
