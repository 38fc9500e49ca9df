//! `sdc-questionnaire-launchContext`
//!
//! One outer extension per context with `name` (a Coding from the SDC
//! launch context code system), `type` (a resource type code) and an
//! optional `description`.

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Coding, Extension, TypedValue};
use phf::phf_map;
use serde_json::Value;

static LAUNCH_CONTEXT_DISPLAY: phf::Map<&'static str, &'static str> = phf_map! {
    "patient" => "Patient",
    "encounter" => "Encounter",
    "location" => "Location",
    "user" => "User",
    "study" => "ResearchStudy",
    "practitioner" => "Practitioner",
    "organization" => "Organization",
    "sourceQueries" => "Source Queries",
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaunchContext {
    /// Code from the launch context code system
    pub name: String,
    /// Resource type
    pub type_: String,
    pub description: String,
}

impl LaunchContext {
    fn is_set(&self) -> bool {
        !(self.name.is_empty() && self.type_.is_empty() && self.description.is_empty())
    }
}

/// Coding for a launch context name. Unknown codes get no display.
pub fn launch_context_coding(code: &str) -> Coding {
    let coding = Coding::new(urls::LAUNCH_CONTEXT_SYSTEM, code);
    match LAUNCH_CONTEXT_DISPLAY.get(code) {
        Some(display) => coding.with_display(*display),
        None => coding,
    }
}

pub struct LaunchContextCodec;

impl ExtensionCodec for LaunchContextCodec {
    type Value = Vec<LaunchContext>;

    const URL: &'static str = urls::LAUNCH_CONTEXT;

    fn decode(extensions: &[Value]) -> Vec<LaunchContext> {
        super::matching(extensions, Self::URL)
            .filter(|e| !e.extension.is_empty())
            .map(|e| LaunchContext {
                name: e
                    .child("name")
                    .and_then(|n| n.value.as_ref())
                    .and_then(TypedValue::as_coding)
                    .and_then(|c| c.code.clone())
                    .unwrap_or_default(),
                type_: e.child_str("type").unwrap_or_default().to_string(),
                description: e.child_str("description").unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn build(contexts: &Vec<LaunchContext>, _: &CodecContext<'_>) -> Vec<Extension> {
        contexts
            .iter()
            .filter(|c| c.is_set())
            .map(|c| {
                let mut inner = Vec::new();
                if !c.description.is_empty() {
                    inner.push(Extension::with_value(
                        "description",
                        TypedValue::String(c.description.clone()),
                    ));
                }
                if !c.type_.is_empty() {
                    inner.push(Extension::with_value("type", TypedValue::Code(c.type_.clone())));
                }
                if !c.name.is_empty() {
                    inner.push(Extension::with_value(
                        "name",
                        TypedValue::Coding(launch_context_coding(&c.name)),
                    ));
                }
                Extension::with_children(Self::URL, inner)
            })
            .collect()
    }
}
