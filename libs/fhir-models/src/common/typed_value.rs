//! Choice-typed values (`value[x]`, `answer[x]`)
//!
//! FHIR spells a polymorphic element as a family of keys sharing a prefix,
//! e.g. `valueString`, `valueCoding`, `answerBoolean`. [`TypedValue`] is the
//! tagged form of such an element. Suffixes without a dedicated variant and
//! payloads that do not fit the expected shape are kept verbatim in
//! [`TypedValue::Other`].

use super::complex::{CodeableConcept, Coding, Expression, Quantity, Reference};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Boolean(bool),
    Integer(i64),
    Decimal(Number),
    String(String),
    Code(String),
    Uri(String),
    Url(String),
    Canonical(String),
    Date(String),
    DateTime(String),
    Time(String),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Duration(Quantity),
    Expression(Expression),
    Reference(Reference),
    Attachment(Map<String, Value>),
    Other { suffix: String, value: Value },
}

impl TypedValue {
    /// The type suffix as it appears after the element prefix
    pub fn suffix(&self) -> &str {
        match self {
            TypedValue::Boolean(_) => "Boolean",
            TypedValue::Integer(_) => "Integer",
            TypedValue::Decimal(_) => "Decimal",
            TypedValue::String(_) => "String",
            TypedValue::Code(_) => "Code",
            TypedValue::Uri(_) => "Uri",
            TypedValue::Url(_) => "Url",
            TypedValue::Canonical(_) => "Canonical",
            TypedValue::Date(_) => "Date",
            TypedValue::DateTime(_) => "DateTime",
            TypedValue::Time(_) => "Time",
            TypedValue::Coding(_) => "Coding",
            TypedValue::CodeableConcept(_) => "CodeableConcept",
            TypedValue::Quantity(_) => "Quantity",
            TypedValue::Duration(_) => "Duration",
            TypedValue::Expression(_) => "Expression",
            TypedValue::Reference(_) => "Reference",
            TypedValue::Attachment(_) => "Attachment",
            TypedValue::Other { suffix, .. } => suffix,
        }
    }

    /// Build a value from its suffix and JSON payload.
    ///
    /// Never fails: a payload of the wrong shape becomes `Other`.
    pub fn from_suffix(suffix: &str, value: &Value) -> TypedValue {
        let parsed = match suffix {
            "Boolean" => value.as_bool().map(TypedValue::Boolean),
            "Integer" => value.as_i64().map(TypedValue::Integer),
            "Decimal" => match value {
                Value::Number(n) => Some(TypedValue::Decimal(n.clone())),
                _ => None,
            },
            "String" => value.as_str().map(|s| TypedValue::String(s.to_string())),
            "Code" => value.as_str().map(|s| TypedValue::Code(s.to_string())),
            "Uri" => value.as_str().map(|s| TypedValue::Uri(s.to_string())),
            "Url" => value.as_str().map(|s| TypedValue::Url(s.to_string())),
            "Canonical" => value.as_str().map(|s| TypedValue::Canonical(s.to_string())),
            "Date" => value.as_str().map(|s| TypedValue::Date(s.to_string())),
            "DateTime" => value.as_str().map(|s| TypedValue::DateTime(s.to_string())),
            "Time" => value.as_str().map(|s| TypedValue::Time(s.to_string())),
            "Coding" => typed(value).map(TypedValue::Coding),
            "CodeableConcept" => typed(value).map(TypedValue::CodeableConcept),
            "Quantity" => typed(value).map(TypedValue::Quantity),
            "Duration" => typed(value).map(TypedValue::Duration),
            "Expression" => typed(value).map(TypedValue::Expression),
            "Reference" => typed(value).map(TypedValue::Reference),
            "Attachment" => value.as_object().cloned().map(TypedValue::Attachment),
            _ => None,
        };
        parsed.unwrap_or_else(|| TypedValue::Other {
            suffix: suffix.to_string(),
            value: value.clone(),
        })
    }

    /// JSON payload (without the key)
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::Decimal(n) => Value::Number(n.clone()),
            TypedValue::String(s)
            | TypedValue::Code(s)
            | TypedValue::Uri(s)
            | TypedValue::Url(s)
            | TypedValue::Canonical(s)
            | TypedValue::Date(s)
            | TypedValue::DateTime(s)
            | TypedValue::Time(s) => Value::String(s.clone()),
            TypedValue::Coding(c) => to_json(c),
            TypedValue::CodeableConcept(c) => to_json(c),
            TypedValue::Quantity(q) | TypedValue::Duration(q) => to_json(q),
            TypedValue::Expression(e) => to_json(e),
            TypedValue::Reference(r) => to_json(r),
            TypedValue::Attachment(a) => Value::Object(a.clone()),
            TypedValue::Other { value, .. } => value.clone(),
        }
    }

    /// Full key for this value under `prefix`, e.g. `valueCoding`
    pub fn key(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.suffix())
    }

    /// Find the first `prefix[x]` member of `map`.
    pub fn from_prefixed(map: &Map<String, Value>, prefix: &str) -> Option<TypedValue> {
        map.iter()
            .find_map(|(key, value)| choice_suffix(key, prefix).map(|s| (s, value)))
            .map(|(suffix, value)| TypedValue::from_suffix(suffix, value))
    }

    /// Remove every `prefix[x]` member from `map`, returning the first one.
    pub fn remove_prefixed(map: &mut Map<String, Value>, prefix: &str) -> Option<TypedValue> {
        let found = Self::from_prefixed(map, prefix);
        map.retain(|key, _| choice_suffix(key, prefix).is_none());
        found
    }

    /// Insert as `prefix[x]` into `map`.
    pub fn insert_prefixed(&self, map: &mut Map<String, Value>, prefix: &str) {
        map.insert(self.key(prefix), self.to_json());
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s)
            | TypedValue::Code(s)
            | TypedValue::Uri(s)
            | TypedValue::Url(s)
            | TypedValue::Canonical(s)
            | TypedValue::Date(s)
            | TypedValue::DateTime(s)
            | TypedValue::Time(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_coding(&self) -> Option<&Coding> {
        match self {
            TypedValue::Coding(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_codeable_concept(&self) -> Option<&CodeableConcept> {
        match self {
            TypedValue::CodeableConcept(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            TypedValue::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            TypedValue::Quantity(q) | TypedValue::Duration(q) => Some(q),
            _ => None,
        }
    }
}

/// Suffix of `key` if it is a `prefix[x]` choice key.
///
/// `answerOption` matches the `answer` prefix syntactically; callers pick
/// the prefix for the object they are looking at.
pub fn choice_suffix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let suffix = key.strip_prefix(prefix)?;
    suffix
        .chars()
        .next()
        .filter(|c| c.is_ascii_uppercase())
        .map(|_| suffix)
}

fn typed<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    // The complex types hold only strings, numbers and maps, which
    // always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}
