//! landmark-core: Assessment session controller, scoring, and question bank.
//!
//! This crate owns the phase state machine that sequences landmark location,
//! finding classification, and multiple-choice questions, along with the
//! scoring log and the summary handed to the upload collaborator.

pub mod bank;
pub mod catalog;
pub mod clock;
pub mod driver;
pub mod error;
pub mod model;
pub mod presenter;
pub mod random;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod traits;
