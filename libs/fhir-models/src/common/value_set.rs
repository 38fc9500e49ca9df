//! FHIR ValueSet model
//!
//! Only what the builder needs to offer choice lists: the enumerated part
//! of `compose` and the `expansion` returned by `$expand`.

use super::complex::{Coding, PublicationStatus};
use super::error::{expect_resource_type, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// FHIR ValueSet resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSet {
    /// Resource type - always "ValueSet"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier; expansions returned inline may omit it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub status: PublicationStatus,

    /// Content logical definition (the "intension")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose: Option<ValueSetCompose>,

    /// Used when the value set is "expanded"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<ValueSetExpansion>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

fn default_resource_type() -> String {
    "ValueSet".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCompose {
    #[serde(default)]
    pub include: Vec<ValueSetInclude>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetInclude {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Specific codes from the system
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<ValueSetConcept>,

    /// filter, valueSet ...
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueSetConcept {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ValueSetExpansionContains>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Codes in an expansion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansionContains {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// If user cannot select this entry
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Code - if blank, this is not a selectable code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Codes contained under this entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ValueSetExpansionContains>,
}

impl ValueSet {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        expect_resource_type(value, "ValueSet")?;
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Selectable codes of this value set.
    ///
    /// Uses the expansion when present (flattening nested `contains` and
    /// skipping abstract entries), otherwise the enumerated concepts of
    /// `compose.include`.
    pub fn codings(&self) -> Vec<Coding> {
        let mut codings = Vec::new();
        if let Some(expansion) = &self.expansion {
            collect_contains(&expansion.contains, &mut codings);
            return codings;
        }
        for include in self.compose.iter().flat_map(|c| &c.include) {
            for concept in &include.concept {
                codings.push(Coding {
                    system: include.system.clone(),
                    version: include.version.clone(),
                    code: Some(concept.code.clone()),
                    display: concept.display.clone(),
                    ..Default::default()
                });
            }
        }
        codings
    }
}

fn collect_contains(contains: &[ValueSetExpansionContains], out: &mut Vec<Coding>) {
    for entry in contains {
        if entry.is_abstract != Some(true) && entry.code.is_some() {
            out.push(Coding {
                system: entry.system.clone(),
                version: entry.version.clone(),
                code: entry.code.clone(),
                display: entry.display.clone(),
                ..Default::default()
            });
        }
        collect_contains(&entry.contains, out);
    }
}
