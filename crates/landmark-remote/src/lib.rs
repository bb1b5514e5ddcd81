//! landmark-remote: Remote collaborators for assessment sessions.
//!
//! Implements `QuestionSource` and `SessionUploader` over HTTP, loads the
//! session configuration, and provides mock collaborators for tests.

pub mod config;
pub mod mock;
pub mod questions;
pub mod upload;

pub use config::{load_config, load_config_from, LandmarkConfig};
pub use landmark_core::error::{FetchError, UploadError};
pub use questions::HttpQuestionSource;
pub use upload::HttpUploader;
