//! Error types for giasu.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("template '{template}' rendered without required variable '{variable}'")]
    MissingVariable { template: String, variable: String },

    #[error("data file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
