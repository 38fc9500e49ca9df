//! FHIR complex types and shared data structures
//!
//! These are the datatypes the questionnaire builder reads and writes
//! inside extensions, enableWhen answers and use contexts. Every struct
//! keeps unknown members in a flattened map so that a value survives a
//! parse/serialize cycle unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Publication status of a conformance resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Active,
    Retired,
    Unknown,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Active => "active",
            PublicationStatus::Retired => "retired",
            PublicationStatus::Unknown => "unknown",
        }
    }
}

/// Coding - a reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<bool>,

    /// Members not modelled above (id, extension, ...)
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// Concept - reference to a terminology or just text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl CodeableConcept {
    pub fn has_code(&self, code: &str) -> bool {
        self.coding.iter().any(|c| c.code.as_deref() == Some(code))
    }
}

/// Expression - an expression that can be used to generate a value
///
/// `language` is required by FHIR but the builder tolerates its absence
/// while the user is still typing; codecs fill in `text/fhirpath`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Expression {
    pub const FHIRPATH: &'static str = "text/fhirpath";

    pub fn fhirpath(expression: impl Into<String>) -> Self {
        Self {
            language: Some(Self::FHIRPATH.to_string()),
            expression: Some(expression.into()),
            ..Default::default()
        }
    }

    /// True when at least one user-editable member holds text.
    pub fn is_set(&self) -> bool {
        [
            &self.name,
            &self.description,
            &self.expression,
            &self.language,
            &self.reference,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Quantity - a measured amount; also used for Duration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// A length of time
pub type Duration = Quantity;

/// Reference - a reference from one resource to another
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// UsageContext - usage context for a conformance resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageContext {
    pub code: Coding,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    /// valueQuantity, valueRange, valueReference ...
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}
