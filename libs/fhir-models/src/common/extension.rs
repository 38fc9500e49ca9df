//! FHIR Extension
//!
//! Extensions are kept as raw JSON on the resources the builder edits;
//! this type is the parsed view used when reading or building one.

use super::typed_value::{choice_suffix, TypedValue};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extension {
    /// Identifies the meaning of the extension
    pub url: String,

    /// Value of extension (`value[x]`)
    pub value: Option<TypedValue>,

    /// Nested extensions
    pub extension: Vec<Extension>,

    /// Members other than url/extension/value[x] (id, ...)
    pub other: Map<String, Value>,
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_value(url: impl Into<String>, value: TypedValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn with_children(url: impl Into<String>, children: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            extension: children,
            ..Default::default()
        }
    }

    /// Parse a JSON extension. Returns `None` when there is no string `url`.
    ///
    /// Nested entries that cannot be parsed are skipped.
    pub fn parse(value: &Value) -> Option<Extension> {
        let object = value.as_object()?;
        let url = object.get("url")?.as_str()?.to_string();

        let mut ext = Extension::new(url);
        for (key, member) in object {
            match key.as_str() {
                "url" => {}
                "extension" => {
                    ext.extension = member
                        .as_array()
                        .map(|children| children.iter().filter_map(Extension::parse).collect())
                        .unwrap_or_default();
                }
                _ => match choice_suffix(key, "value") {
                    Some(suffix) if ext.value.is_none() => {
                        ext.value = Some(TypedValue::from_suffix(suffix, member));
                    }
                    _ => {
                        ext.other.insert(key.clone(), member.clone());
                    }
                },
            }
        }
        Some(ext)
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("url".to_string(), Value::String(self.url.clone()));
        for (key, value) in &self.other {
            object.insert(key.clone(), value.clone());
        }
        if !self.extension.is_empty() {
            object.insert(
                "extension".to_string(),
                Value::Array(self.extension.iter().map(Extension::to_json).collect()),
            );
        }
        if let Some(value) = &self.value {
            value.insert_prefixed(&mut object, "value");
        }
        Value::Object(object)
    }

    /// First nested extension with `url`
    pub fn child(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }

    /// String value of the first nested extension with `url`
    pub fn child_str(&self, url: &str) -> Option<&str> {
        self.child(url)?.value.as_ref()?.as_str()
    }
}

/// `url` of a raw JSON extension
pub fn url_of(value: &Value) -> Option<&str> {
    value.get("url")?.as_str()
}
