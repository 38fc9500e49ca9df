//! Error types for fhir-client

use ferrum_models::OperationOutcome;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Non-success response; `outcome` carries the server's diagnostics
    #[error("Server returned {status}: {}", describe(.outcome, .body))]
    ServerError {
        status: u16,
        outcome: Option<OperationOutcome>,
        body: String,
    },

    #[error("Resource has no id: {0}")]
    MissingId(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Questionnaire(#[from] ferrum_questionnaire::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn describe(outcome: &Option<OperationOutcome>, body: &str) -> String {
    match outcome {
        Some(outcome) => outcome.summary(),
        None => body.to_string(),
    }
}

impl Error {
    /// The server's OperationOutcome, if the failure carried one
    pub fn outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Error::ServerError { outcome, .. } => outcome.as_ref(),
            _ => None,
        }
    }
}
