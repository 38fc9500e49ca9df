//! Error types for session

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid state key: {0:?}")]
    InvalidKey(String),

    #[error("Stored value under {key:?} is malformed: {reason}")]
    CorruptState { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Questionnaire(#[from] ferrum_questionnaire::Error),

    #[error(transparent)]
    Client(#[from] ferrum_fhir_client::Error),
}
