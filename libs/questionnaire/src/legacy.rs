//! Legacy form conversion
//!
//! Forms that are not FHIR Questionnaires are converted to one before
//! lifting. The built-in converter handles LForms definitions
//! (`{name, code, items: [{questionCode, question, dataType, ...}]}`).

use crate::codecs::help;
use crate::error::{Error, Result};
use crate::linkid::generate_link_id;
use crate::urls;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

pub trait LegacyConverter {
    /// Short label for logs
    fn name(&self) -> &'static str;

    fn accepts(&self, raw: &Value) -> bool;

    /// Convert into raw FHIR Questionnaire JSON
    fn convert(&self, raw: &Value) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LformsConverter;

impl LegacyConverter for LformsConverter {
    fn name(&self) -> &'static str {
        "lforms"
    }

    fn accepts(&self, raw: &Value) -> bool {
        raw.get("resourceType").is_none() && raw.get("name").is_some_and(Value::is_string)
    }

    fn convert(&self, raw: &Value) -> Result<Value> {
        let form = raw
            .as_object()
            .ok_or_else(|| Error::NotAQuestionnaire("LForms form is not an object".to_string()))?;

        let mut out = Map::new();
        out.insert("resourceType".to_string(), json!("Questionnaire"));
        out.insert("status".to_string(), json!("draft"));
        if let Some(name) = form.get("name").and_then(Value::as_str) {
            out.insert("title".to_string(), json!(name));
        }
        if let Some(code) = form.get("code").and_then(Value::as_str) {
            out.insert(
                "code".to_string(),
                json!([loinc_coding(code, form.get("name").and_then(Value::as_str))]),
            );
        }

        let mut used = HashSet::new();
        let items = convert_items(form.get("items"), &mut used)?;
        out.insert("item".to_string(), Value::Array(items));
        Ok(Value::Object(out))
    }
}

fn convert_items(items: Option<&Value>, used: &mut HashSet<String>) -> Result<Vec<Value>> {
    match items {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| convert_item(item, used))
            .collect(),
        Some(_) => Err(Error::NotAQuestionnaire(
            "LForms items member is not an array".to_string(),
        )),
    }
}

fn convert_item(item: &Map<String, Value>, used: &mut HashSet<String>) -> Result<Value> {
    let question = item.get("question").and_then(Value::as_str);
    let question_code = item.get("questionCode").and_then(Value::as_str);

    let link_id = match question_code {
        Some(code) if used.insert(code.to_string()) => code.to_string(),
        _ => loop {
            let candidate = generate_link_id();
            if used.insert(candidate.clone()) {
                break candidate;
            }
        },
    };

    let children = convert_items(item.get("items"), used)?;
    let item_type = match item.get("dataType") {
        Some(Value::String(code)) => fhir_type(Some(code)),
        Some(Value::Null) => fhir_type(None),
        _ if item.get("header").and_then(Value::as_bool) == Some(true) || !children.is_empty() => {
            fhir_type(Some("SECTION"))
        }
        _ => "string",
    };

    let mut out = Map::new();
    out.insert("linkId".to_string(), json!(link_id));
    if let Some(code) = question_code {
        out.insert("code".to_string(), json!([loinc_coding(code, question)]));
    }
    if let Some(text) = question {
        out.insert("text".to_string(), json!(text));
    }
    out.insert("type".to_string(), json!(item_type));

    if let Some(min) = cardinality(item, "answerCardinality", "min") {
        out.insert("required".to_string(), json!(min != "0"));
    }
    if let Some(max) = cardinality(item, "questionCardinality", "max") {
        out.insert("repeats".to_string(), json!(max == "*" || max.parse::<u32>().is_ok_and(|n| n > 1)));
    }

    if let Some(Value::Array(answers)) = item.get("answers") {
        let options: Vec<Value> = answers
            .iter()
            .map(|answer| json!({"valueCoding": answer_coding(answer)}))
            .collect();
        out.insert("answerOption".to_string(), Value::Array(options));
    }

    if let Some(Value::Array(units)) = item.get("units") {
        let extensions: Vec<Value> = units.iter().filter_map(unit_extension).collect();
        out.insert("extension".to_string(), Value::Array(extensions));
    }

    let mut children = children;
    if let Some(instructions) = item.get("codingInstructions").and_then(Value::as_str) {
        if !instructions.trim().is_empty() {
            children.push(Value::Object(help::help_item(&link_id, instructions)));
        }
    }
    if !children.is_empty() {
        out.insert("item".to_string(), Value::Array(children));
    }
    Ok(Value::Object(out))
}

/// LForms data type to FHIR item type; `None` is a panel.
pub fn fhir_type(data_type: Option<&str>) -> &'static str {
    match data_type {
        Some("INT") => "integer",
        Some("REAL") => "decimal",
        Some("DT" | "DAY" | "MONTH" | "YEAR") => "date",
        Some("DTM") => "dateTime",
        Some("ST" | "EMAIL" | "PHONE") => "string",
        Some("TITLE") => "display",
        Some("TM") => "time",
        Some("SECTION") | None => "group",
        Some("URL") => "url",
        Some("QTY") => "quantity",
        Some("CNE") => "choice",
        Some("CWE") => "open-choice",
        Some(_) => "string",
    }
}

fn loinc_coding(code: &str, display: Option<&str>) -> Value {
    let mut coding = json!({"system": urls::LOINC, "code": code});
    if let Some(display) = display {
        coding["display"] = json!(display);
    }
    coding
}

fn answer_coding(answer: &Value) -> Value {
    let mut coding = Map::new();
    if let Some(code) = answer.get("AnswerStringID").or_else(|| answer.get("code")) {
        coding.insert("code".to_string(), code.clone());
    }
    coding.insert("system".to_string(), json!(urls::LOINC));
    if let Some(display) = answer.get("DisplayText").or_else(|| answer.get("text")) {
        coding.insert("display".to_string(), display.clone());
    }
    Value::Object(coding)
}

/// Units are plain strings or `{name}` objects.
fn unit_extension(unit: &Value) -> Option<Value> {
    let unit = match unit {
        Value::String(unit) => unit.as_str(),
        other => other.get("name")?.as_str()?,
    };
    Some(json!({
        "url": urls::UNIT,
        "valueCoding": {"code": unit, "system": urls::UCUM, "display": unit}
    }))
}

fn cardinality<'a>(item: &'a Map<String, Value>, key: &str, bound: &str) -> Option<&'a str> {
    item.get(key)?.get(bound)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_table() {
        assert_eq!(fhir_type(Some("INT")), "integer");
        assert_eq!(fhir_type(Some("YEAR")), "date");
        assert_eq!(fhir_type(Some("PHONE")), "string");
        assert_eq!(fhir_type(Some("TITLE")), "display");
        assert_eq!(fhir_type(None), "group");
        assert_eq!(fhir_type(Some("CWE")), "open-choice");
        assert_eq!(fhir_type(Some("BIN")), "string");
    }

    #[test]
    fn accepts_named_forms_only() {
        let converter = LformsConverter;
        assert!(converter.accepts(&json!({"name": "Vitals", "items": []})));
        assert!(!converter.accepts(&json!({"resourceType": "Questionnaire", "name": "Q"})));
        assert!(!converter.accepts(&json!({"items": []})));
    }

    #[test]
    fn converts_items_answers_and_units() {
        let form = json!({
            "name": "Vitals",
            "code": "8716-3",
            "items": [
                {
                    "questionCode": "8302-2",
                    "question": "Body height",
                    "dataType": "REAL",
                    "units": [{"name": "cm"}, "in"],
                    "codingInstructions": "Without shoes"
                },
                {
                    "questionCode": "8302-2",
                    "question": "Smoker",
                    "dataType": "CNE",
                    "answerCardinality": {"min": "1", "max": "1"},
                    "answers": [{"AnswerStringID": "LA33-6", "DisplayText": "Yes"}]
                },
                {"question": "Section", "dataType": null, "items": [{"question": "Note"}]}
            ]
        });
        let q = LformsConverter.convert(&form).unwrap();

        assert_eq!(q["title"], json!("Vitals"));
        assert_eq!(q["code"][0]["code"], json!("8716-3"));

        let height = &q["item"][0];
        assert_eq!(height["linkId"], json!("8302-2"));
        assert_eq!(height["type"], json!("decimal"));
        assert_eq!(height["extension"][1]["valueCoding"]["code"], json!("in"));
        assert_eq!(height["extension"][0]["url"], json!(urls::UNIT));
        assert!(help::is_help_item(&height["item"][0]));

        let smoker = &q["item"][1];
        assert_ne!(smoker["linkId"], json!("8302-2"));
        assert_eq!(smoker["type"], json!("choice"));
        assert_eq!(smoker["required"], json!(true));
        assert_eq!(
            smoker["answerOption"][0]["valueCoding"],
            json!({"code": "LA33-6", "system": urls::LOINC, "display": "Yes"})
        );

        assert_eq!(q["item"][2]["type"], json!("group"));
        assert_eq!(q["item"][2]["item"][0]["type"], json!("string"));
    }

    #[test]
    fn malformed_items_are_rejected() {
        let err = LformsConverter.convert(&json!({"name": "X", "items": "nope"})).unwrap_err();
        assert!(matches!(err, Error::NotAQuestionnaire(_)));
    }
}
