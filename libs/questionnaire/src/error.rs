//! Error types for questionnaire lifting, lowering and editing

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input text is empty or not JSON
    #[error("Not a valid JSON: {0}")]
    Parse(String),

    /// Valid JSON that is neither a Questionnaire nor a convertible legacy form
    #[error("Not a valid questionnaire: {0}")]
    NotAQuestionnaire(String),

    /// Two items would share a linkId
    #[error("Duplicate linkId '{0}'")]
    DuplicateLinkId(String),

    #[error("Unknown item node {0}")]
    UnknownNode(usize),

    /// Moving a node under itself or one of its descendants
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
