//! FHIR OperationOutcome model
//!
//! Returned by servers for errors and by `$validate`.

use super::error::{expect_resource_type, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    /// Resource type - always "OperationOutcome"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A single issue associated with the action
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

fn default_resource_type() -> String {
    "OperationOutcome".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcomeIssue {
    /// fatal | error | warning | information
    pub severity: IssueSeverity,

    /// Error or warning code
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,

    /// FHIRPath of element(s) related to issue
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expression: Vec<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl OperationOutcome {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        expect_resource_type(value, "OperationOutcome")?;
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// True if any issue is fatal or an error
    pub fn has_errors(&self) -> bool {
        self.issue
            .iter()
            .any(|i| matches!(i.severity, IssueSeverity::Fatal | IssueSeverity::Error))
    }

    /// Diagnostics of every issue, one per line
    pub fn summary(&self) -> String {
        self.issue
            .iter()
            .map(|i| {
                let location = i.expression.join(", ");
                let text = i.diagnostics.as_deref().unwrap_or(&i.code);
                if location.is_empty() {
                    format!("[{:?}] {}", i.severity, text)
                } else {
                    format!("[{:?}] {} ({})", i.severity, text, location)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_outcome() {
        let outcome = OperationOutcome::from_value(&json!({
            "resourceType": "OperationOutcome",
            "issue": [
                {"severity": "warning", "code": "informational", "diagnostics": "check title"},
                {"severity": "error", "code": "invalid", "diagnostics": "bad linkId", "expression": ["Questionnaire.item[0]"]}
            ]
        }))
        .unwrap();

        assert!(outcome.has_errors());
        assert_eq!(
            outcome.summary(),
            "[Warning] check title\n[Error] bad linkId (Questionnaire.item[0])"
        );
    }

    #[test]
    fn test_rejects_other_resources() {
        assert!(OperationOutcome::from_value(&json!({"resourceType": "Patient"})).is_err());
    }

    #[test]
    fn test_warnings_only() {
        let outcome: OperationOutcome = serde_json::from_value(json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "information", "code": "informational"}]
        }))
        .unwrap();
        assert!(!outcome.has_errors());
    }
}
