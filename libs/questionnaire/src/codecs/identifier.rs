//! Identifier type shorthand
//!
//! The editor records an identifier's type as a bare Coding chosen from
//! the identifier system's `has-type` property; FHIR wants a
//! CodeableConcept.

use ferrum_models::Coding;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Set `identifier[i].type` for every recorded type.
pub fn apply_identifier_types(root: &mut Map<String, Value>, types: &BTreeMap<usize, Coding>) {
    if types.is_empty() {
        return;
    }
    let Some(identifiers) = root.get_mut("identifier").and_then(Value::as_array_mut) else {
        tracing::warn!("Identifier types recorded but the questionnaire has no identifier");
        return;
    };
    for (index, coding) in types {
        match identifiers.get_mut(*index).and_then(Value::as_object_mut) {
            Some(identifier) => {
                let coding = serde_json::to_value(coding).unwrap_or(Value::Null);
                identifier.insert("type".to_string(), json!({ "coding": [coding] }));
            }
            None => tracing::warn!(index, "No identifier at recorded type index"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coding_becomes_codeable_concept() {
        let mut root = json!({"identifier": [
            {"system": "urn:a", "value": "1"},
            {"system": "urn:b", "value": "2"}
        ]})
        .as_object()
        .cloned()
        .unwrap();
        let mut types = BTreeMap::new();
        types.insert(
            1,
            Coding::new("http://terminology.hl7.org/CodeSystem/v2-0203", "MR").with_display("Medical record number"),
        );
        types.insert(5, Coding::new("x", "y"));

        apply_identifier_types(&mut root, &types);
        assert!(root["identifier"][0].get("type").is_none());
        assert_eq!(
            root["identifier"][1]["type"],
            json!({"coding": [{"system": "http://terminology.hl7.org/CodeSystem/v2-0203", "code": "MR", "display": "Medical record number"}]})
        );
    }
}
