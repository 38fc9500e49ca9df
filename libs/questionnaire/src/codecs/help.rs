//! Help text
//!
//! FHIR renders help as a `display` child item carrying the help-button
//! item control. The builder folds that child into its parent while
//! editing and appends it back when lowering.

use crate::urls;
use ferrum_models::{CodeableConcept, Coding, Extension, TypedValue};
use serde_json::{Map, Value};

pub const HELP_LINK_ID_SUFFIX: &str = "_intention";

pub fn help_button_extension() -> Extension {
    let concept = CodeableConcept {
        coding: vec![Coding::new(urls::ITEM_CONTROL_SYSTEM, "help").with_display("Help-Button")],
        text: Some("Intention".to_string()),
        ..Default::default()
    };
    Extension::with_value(urls::ITEM_CONTROL, TypedValue::CodeableConcept(concept))
}

pub fn help_link_id(parent_link_id: &str) -> String {
    format!("{}{}", parent_link_id, HELP_LINK_ID_SUFFIX)
}

/// A display item whose item control includes the `help` code
pub fn is_help_item(item: &Value) -> bool {
    if item.get("type").and_then(Value::as_str) != Some("display") {
        return false;
    }
    let extensions = match item.get("extension").and_then(Value::as_array) {
        Some(extensions) => extensions,
        None => return false,
    };
    super::matching(extensions, urls::ITEM_CONTROL).any(|e| {
        e.value
            .as_ref()
            .and_then(TypedValue::as_codeable_concept)
            .is_some_and(|c| c.has_code("help"))
    })
}

/// Fresh help item for the item identified by `parent_link_id`
pub fn help_item(parent_link_id: &str, text: &str) -> Map<String, Value> {
    let mut item = Map::new();
    item.insert("type".to_string(), Value::from("display"));
    item.insert("linkId".to_string(), Value::from(help_link_id(parent_link_id)));
    item.insert("text".to_string(), Value::from(text));
    item.insert(
        "extension".to_string(),
        Value::Array(vec![help_button_extension().to_json()]),
    );
    item
}

/// Non-blank `text`, or a non-blank rendering extension on `_text`
pub fn has_help_text(help: &Map<String, Value>) -> bool {
    let plain = help
        .get("text")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    let rendered = help
        .get("_text")
        .and_then(|t| t.get("extension"))
        .and_then(Value::as_array)
        .is_some_and(|exts| {
            exts.iter().any(|e| {
                e.get("valueString")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty())
            })
        });
    plain || rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_is_recognised() {
        let item = Value::Object(help_item("q1", "Some help"));
        assert!(is_help_item(&item));
        assert_eq!(item["linkId"], json!("q1_intention"));
        assert_eq!(
            item["extension"][0],
            json!({
                "url": urls::ITEM_CONTROL,
                "valueCodeableConcept": {
                    "text": "Intention",
                    "coding": [{"code": "help", "display": "Help-Button", "system": "http://hl7.org/fhir/questionnaire-item-control"}]
                }
            })
        );
    }

    #[test]
    fn other_display_items_are_not_help() {
        let flyover = json!({
            "type": "display",
            "linkId": "f",
            "extension": [{"url": urls::ITEM_CONTROL, "valueCodeableConcept": {"coding": [{"code": "flyover"}]}}]
        });
        assert!(!is_help_item(&flyover));

        let question = json!({"type": "string", "extension": [help_button_extension().to_json()]});
        assert!(!is_help_item(&question));
    }

    #[test]
    fn help_text_detection() {
        assert!(!has_help_text(&help_item("a", "  ")));
        assert!(has_help_text(&help_item("a", "x")));

        let mut rendered = help_item("a", "");
        rendered.insert(
            "_text".to_string(),
            json!({"extension": [{"url": "http://hl7.org/fhir/StructureDefinition/rendering-xhtml", "valueString": "<b>x</b>"}]}),
        );
        assert!(has_help_text(&rendered));
    }
}
