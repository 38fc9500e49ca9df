//! Preparing a lowered Questionnaire for a FHIR server
//!
//! Runs on `to_fhir` output right before create or update. Only fills in
//! what the server-side profile requires and the author did not set.

use crate::error::{Error, Result};
use crate::urls;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

const MAX_NAME_LEN: usize = 255;
const MAX_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Written to `meta.profile`
    pub profile: String,
    /// Written to `meta.source`
    pub meta_source: String,
    /// Canonical URLs are `<ig_root>/Questionnaire/<id>`
    pub ig_root: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            profile: urls::QUESTIONNAIRE_PROFILE.to_string(),
            meta_source: urls::FORM_BUILDER_ENDPOINT.to_string(),
            ig_root: urls::IG_ROOT.to_string(),
        }
    }
}

/// The signed-in author
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// The server id is derived from `name`
    Create,
    Update,
}

pub fn prepare(
    document: &mut Value,
    mode: PublishMode,
    options: &PublishOptions,
    user: Option<&UserProfile>,
) -> Result<()> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| Error::NotAQuestionnaire("document is not a JSON object".to_string()))?;

    set_meta(root, options);

    let has_name = root
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.trim().is_empty());
    if !has_name {
        if let Some(title) = root.get("title").and_then(Value::as_str) {
            let name = title_to_name(title);
            if !name.is_empty() {
                root.insert("name".to_string(), json!(name));
            }
        }
    }

    if mode == PublishMode::Create {
        let id = root
            .get("name")
            .and_then(Value::as_str)
            .map(sanitize_id)
            .filter(|id| !id.is_empty());
        if let Some(id) = id {
            root.insert("id".to_string(), json!(id));
        }
    }

    if let Some(id) = root.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
        let url = format!("{}/Questionnaire/{}", options.ig_root.trim_end_matches('/'), id);
        root.insert("url".to_string(), json!(url));
    }

    if let Some(user) = user {
        assign_publisher(root, user);
    }

    tracing::debug!(
        ?mode,
        id = root
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default(),
        "Prepared questionnaire for publishing"
    );
    Ok(())
}

fn set_meta(root: &mut Map<String, Value>, options: &PublishOptions) {
    let meta = root
        .entry("meta")
        .or_insert_with(|| Value::Object(Map::new()));
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    if let Some(meta) = meta.as_object_mut() {
        meta.insert("profile".to_string(), json!([options.profile]));
        meta.insert("source".to_string(), json!(options.meta_source));
    }
}

/// `"<displayName>; <email>"`, only when no publisher is set
fn assign_publisher(root: &mut Map<String, Value>, user: &UserProfile) {
    if root.get("publisher").is_some_and(|p| !p.is_null()) {
        return;
    }
    let Some(display_name) = user.display_name.as_deref().filter(|n| !n.is_empty()) else {
        return;
    };
    let publisher = match user.email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => format!("{}; {}", display_name, email),
        None => display_name.to_string(),
    };
    root.insert("publisher".to_string(), json!(publisher));
}

/// Computable name from a human title: `"Données cliniques (v2)"` becomes
/// `"DonneesCliniquesV2"`.
pub fn title_to_name(title: &str) -> String {
    static SPECIAL: OnceLock<Regex> = OnceLock::new();
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let special = SPECIAL.get_or_init(|| {
        Regex::new(r#"[&/\\#, +()_$~%.'":*?<>\[\]{}]"#).expect("special character regex must compile")
    });
    let invalid = INVALID
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("invalid character regex must compile"));

    let folded = fold_accents(title);
    let camel = camel_case(&folded);
    let name = special.replace_all(&camel, "");
    let name = invalid.replace_all(&name, "");
    let name = capitalize(&name);

    name.chars().take(MAX_NAME_LEN).collect()
}

/// Server id from a name: ASCII alphanumerics only, at most 64
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_ID_LEN)
        .collect()
}

fn fold_accents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// First character lowered, every other word start raised, whitespace
/// dropped.
fn camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for (i, c) in text.chars().enumerate() {
        let word_start = is_word(c) && !prev.is_some_and(is_word);
        if i == 0 && is_word(c) {
            out.extend(c.to_lowercase());
        } else if word_start {
            out.extend(c.to_uppercase());
        } else if !c.is_whitespace() {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
