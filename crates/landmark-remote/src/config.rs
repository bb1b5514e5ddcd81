//! Session configuration and collaborator factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use landmark_core::catalog::{load_catalog, LandmarkCatalog};
use landmark_core::traits::{QuestionSource, SessionUploader};

use crate::questions::{
    HttpQuestionSource, DEFAULT_PACKAGE_NAME, DEFAULT_QUESTIONS_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::upload::HttpUploader;

/// Top-level landmark configuration.
///
/// Note: Custom Debug impl masks the auth token to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct LandmarkConfig {
    /// Question service endpoint.
    #[serde(default = "default_questions_url")]
    pub questions_url: String,
    /// Package name sent to the question service.
    #[serde(default = "default_package_name")]
    pub package_name: String,
    /// Results endpoint. Reports stay local when unset.
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Session code issued by the host.
    #[serde(default)]
    pub session_code: Option<String>,
    /// Bearer token issued by the host.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Timeout for each HTTP request.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Delay between the final summary and closing the experience.
    #[serde(default = "default_teardown_delay")]
    pub teardown_delay_secs: f64,
    /// Custom catalog file. The embedded reference catalog is used when unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl std::fmt::Debug for LandmarkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandmarkConfig")
            .field("questions_url", &self.questions_url)
            .field("package_name", &self.package_name)
            .field("upload_url", &self.upload_url)
            .field("session_code", &self.session_code)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("teardown_delay_secs", &self.teardown_delay_secs)
            .field("catalog", &self.catalog)
            .finish()
    }
}

fn default_questions_url() -> String {
    DEFAULT_QUESTIONS_URL.to_string()
}
fn default_package_name() -> String {
    DEFAULT_PACKAGE_NAME.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_teardown_delay() -> f64 {
    5.0
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            questions_url: default_questions_url(),
            package_name: default_package_name(),
            upload_url: None,
            session_code: None,
            auth_token: None,
            request_timeout_secs: default_timeout(),
            teardown_delay_secs: default_teardown_delay(),
            catalog: None,
        }
    }
}

impl LandmarkConfig {
    pub fn teardown_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.teardown_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// The configured catalog, or the embedded reference catalog.
    pub fn load_catalog(&self) -> Result<LandmarkCatalog> {
        match &self.catalog {
            Some(path) => load_catalog(path)
                .with_context(|| format!("failed to load catalog: {}", path.display())),
            None => LandmarkCatalog::reference().context("embedded catalog is invalid"),
        }
    }

    pub fn question_source(&self) -> Result<Arc<dyn QuestionSource>> {
        let source = HttpQuestionSource::new(
            &self.questions_url,
            &self.package_name,
            self.request_timeout_secs,
        )?;
        Ok(Arc::new(source))
    }

    /// An uploader when `upload_url` is set.
    pub fn uploader(&self) -> Result<Option<Arc<dyn SessionUploader>>> {
        let Some(url) = &self.upload_url else {
            return Ok(None);
        };
        let uploader = HttpUploader::new(
            url,
            self.session_code.clone(),
            self.auth_token.clone(),
            self.request_timeout_secs,
        )?;
        Ok(Some(Arc::new(uploader)))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while let Some(offset) = result[pos..].find("${") {
        let start = pos + offset;
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
            pos = start + value.len();
        } else {
            break;
        }
    }
    result
}

fn resolve_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(resolve_env_vars)
        .filter(|v| !v.is_empty())
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `landmark.toml` in the current directory
/// 2. `~/.config/landmark/config.toml`
///
/// Environment variable overrides: `LANDMARK_SESSION_CODE`,
/// `LANDMARK_AUTH_TOKEN`, `LANDMARK_QUESTIONS_URL`.
pub fn load_config() -> Result<LandmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LandmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("landmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LandmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LandmarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(code) = std::env::var("LANDMARK_SESSION_CODE") {
        config.session_code = Some(code);
    }
    if let Ok(token) = std::env::var("LANDMARK_AUTH_TOKEN") {
        config.auth_token = Some(token);
    }
    if let Ok(url) = std::env::var("LANDMARK_QUESTIONS_URL") {
        config.questions_url = url;
    }

    config.questions_url = resolve_env_vars(&config.questions_url);
    config.package_name = resolve_env_vars(&config.package_name);
    config.upload_url = resolve_opt(&config.upload_url);
    config.session_code = resolve_opt(&config.session_code);
    config.auth_token = resolve_opt(&config.auth_token);

    anyhow::ensure!(
        config.teardown_delay_secs.is_finite() && config.teardown_delay_secs >= 0.0,
        "teardown_delay_secs must be a non-negative number"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("landmark"))
}
