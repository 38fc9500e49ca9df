//! Error types for FHIR models

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected a {expected} resource, found {}", .found.as_deref().unwrap_or("no resourceType"))]
    WrongResourceType {
        expected: &'static str,
        found: Option<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn expect_resource_type(value: &Value, expected: &'static str) -> Result<()> {
    match value.get("resourceType").and_then(Value::as_str) {
        Some(found) if found == expected => Ok(()),
        found => Err(Error::WrongResourceType {
            expected,
            found: found.map(str::to_string),
        }),
    }
}
