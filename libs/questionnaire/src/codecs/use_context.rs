//! Questionnaire `useContext` holding the business domain
//!
//! Not an extension: the domain lives in a UsageContext whose `code` is
//! the fixed "domain" coding and whose value is the selected concept.

use crate::urls;
use ferrum_models::{CodeableConcept, Coding, UsageContext};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UseContextValue {
    pub code: String,
    pub display: String,
    pub system: String,
}

/// Index of the entry the domain is read from and written to
fn domain_index(contexts: &[Value]) -> Option<usize> {
    contexts
        .iter()
        .position(|c| {
            c.pointer("/code/code").and_then(Value::as_str) == Some(urls::USAGE_CONTEXT_DOMAIN_CODE)
        })
        .or_else(|| {
            contexts
                .first()
                .and_then(|c| c.pointer("/valueCodeableConcept/coding/0"))
                .map(|_| 0)
        })
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

pub fn decode(root: &Map<String, Value>) -> Option<UseContextValue> {
    let contexts = root.get("useContext")?.as_array()?;
    let coding = contexts
        .get(domain_index(contexts)?)?
        .pointer("/valueCodeableConcept/coding/0")?;
    Some(UseContextValue {
        code: text(coding, "code"),
        display: text(coding, "display"),
        system: text(coding, "system"),
    })
}

pub fn encode(root: &mut Map<String, Value>, value: &Option<UseContextValue>) {
    if decode(root) == *value {
        return;
    }

    let entry = value.as_ref().filter(|v| !v.code.is_empty()).map(|v| {
        let context = UsageContext {
            code: Coding::new(urls::USAGE_CONTEXT_TYPE_SYSTEM, urls::USAGE_CONTEXT_DOMAIN_CODE)
                .with_display(urls::USAGE_CONTEXT_DOMAIN_DISPLAY),
            value_codeable_concept: Some(CodeableConcept {
                coding: vec![Coding {
                    system: non_empty(&v.system),
                    code: non_empty(&v.code),
                    display: non_empty(&v.display),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            extensions: Map::new(),
        };
        serde_json::to_value(context).unwrap_or(Value::Null)
    });

    let slot = root
        .entry("useContext")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    if let Value::Array(contexts) = slot {
        match (domain_index(contexts), entry) {
            (Some(i), Some(entry)) => contexts[i] = entry,
            (Some(i), None) => {
                contexts.remove(i);
            }
            (None, Some(entry)) => contexts.insert(0, entry),
            (None, None) => {}
        }
    }
}
