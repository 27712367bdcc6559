pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod log;
pub mod metrics;
pub mod render;
pub mod service;

pub use crate::cli::Args;
pub use crate::client::{Outcome, ReportSubmissionClient, RequestState};
pub use crate::config::{AppConfig, LogConfig, ServiceConfig};
pub use crate::domain::{
    ActivityLevel, Deficiency, ExtractionResult, InferenceResult, PatientProfile, Sex,
    UploadedDocument, WeeklyPlan,
};
pub use crate::error::{Error, SubmissionError};
pub use crate::log::init;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub mod test_helpers;
