//! Extension codecs
//!
//! Each codec owns one extension URL and one internal field. `decode`
//! reads the item's raw extension list leniently: malformed entries count
//! as absent. `encode` rewrites the list only when the internal value
//! differs from what the list already decodes to, so an unedited item
//! keeps its extensions byte for byte. A rewrite removes every entry with
//! the codec's URL and puts the new entries where the first removed one
//! was, or at the end.

pub mod expression;
pub mod extraction;
pub mod help;
pub mod hidden_item;
pub mod identifier;
pub mod item_source;
pub mod launch_context;
pub mod observation;
pub mod terminology_server;
pub mod use_context;

pub use expression::{AnswerExpression, CalculatedExpression, InitialExpression, Variable};
pub use extraction::{ExtractionContext, ItemExtractionContext};
pub use hidden_item::HiddenItem;
pub use item_source::{ItemSource, ItemSourceCodec};
pub use launch_context::{launch_context_coding, LaunchContext, LaunchContextCodec};
pub use observation::{LinkPeriod, ObservationExtract, ObservationLinkPeriod};
pub use terminology_server::PreferredTerminologyServer;
pub use use_context::UseContextValue;

use crate::model::{DocumentState, ItemState};
use crate::units::{TimeUnits, UnitResolver};
use ferrum_models::{url_of, Extension};
use serde_json::Value;
use std::fmt::Debug;

static DEFAULT_UNITS: TimeUnits = TimeUnits;

/// Collaborators codecs need while building extensions
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub units: &'a dyn UnitResolver,
}

impl Default for CodecContext<'static> {
    fn default() -> Self {
        Self {
            units: &DEFAULT_UNITS,
        }
    }
}

pub trait ExtensionCodec {
    /// Internal representation; `Default` is the "not set" value.
    type Value: PartialEq + Default + Debug;

    const URL: &'static str;

    fn decode(extensions: &[Value]) -> Self::Value;

    /// Extensions representing `value`; empty when the value is not set.
    fn build(value: &Self::Value, ctx: &CodecContext<'_>) -> Vec<Extension>;

    fn encode(extensions: &mut Vec<Value>, value: &Self::Value, ctx: &CodecContext<'_>) {
        if Self::decode(extensions) == *value {
            return;
        }
        let replacement = Self::build(value, ctx)
            .iter()
            .map(Extension::to_json)
            .collect();
        replace_all(extensions, Self::URL, replacement);
    }
}

/// Parsed extensions with `url`, in list order
pub fn matching<'a>(extensions: &'a [Value], url: &'a str) -> impl Iterator<Item = Extension> + 'a {
    extensions
        .iter()
        .filter(move |e| url_of(e) == Some(url))
        .filter_map(Extension::parse)
}

pub fn first_matching(extensions: &[Value], url: &str) -> Option<Extension> {
    matching(extensions, url).next()
}

/// Replace every entry with `url` by `replacement`.
pub fn replace_all(extensions: &mut Vec<Value>, url: &str, replacement: Vec<Value>) {
    let position = extensions.iter().position(|e| url_of(e) == Some(url));
    extensions.retain(|e| url_of(e) != Some(url));
    let at = position.unwrap_or(extensions.len()).min(extensions.len());
    extensions.splice(at..at, replacement);
}

pub fn decode_item(extensions: &[Value], state: &mut ItemState) {
    state.hidden = HiddenItem::decode(extensions);
    state.observation_link_period = ObservationLinkPeriod::decode(extensions);
    state.observation_extract = ObservationExtract::decode(extensions);
    state.extraction_context = ItemExtractionContext::decode(extensions);
    state.answer_expressions = AnswerExpression::decode(extensions);
    state.calculated_expressions = CalculatedExpression::decode(extensions);
    state.initial_expressions = InitialExpression::decode(extensions);
    state.sources = ItemSourceCodec::decode(extensions);
    state.terminology_server = PreferredTerminologyServer::decode(extensions);
}

pub fn encode_item(extensions: &mut Vec<Value>, state: &ItemState, ctx: &CodecContext<'_>) {
    HiddenItem::encode(extensions, &state.hidden, ctx);
    ObservationLinkPeriod::encode(extensions, &state.observation_link_period, ctx);
    ObservationExtract::encode(extensions, &state.observation_extract, ctx);
    ItemExtractionContext::encode(extensions, &state.extraction_context, ctx);
    AnswerExpression::encode(extensions, &state.answer_expressions, ctx);
    CalculatedExpression::encode(extensions, &state.calculated_expressions, ctx);
    InitialExpression::encode(extensions, &state.initial_expressions, ctx);
    ItemSourceCodec::encode(extensions, &state.sources, ctx);
    PreferredTerminologyServer::encode(extensions, &state.terminology_server, ctx);
}

pub fn decode_document(extensions: &[Value], state: &mut DocumentState) {
    state.launch_context = LaunchContextCodec::decode(extensions);
    state.variables = Variable::decode(extensions);
    state.extraction_context = ItemExtractionContext::decode(extensions);
    state.terminology_server = PreferredTerminologyServer::decode(extensions);
}

pub fn encode_document(extensions: &mut Vec<Value>, state: &DocumentState, ctx: &CodecContext<'_>) {
    LaunchContextCodec::encode(extensions, &state.launch_context, ctx);
    Variable::encode(extensions, &state.variables, ctx);
    ItemExtractionContext::encode(extensions, &state.extraction_context, ctx);
    PreferredTerminologyServer::encode(extensions, &state.terminology_server, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap()
    }

    #[test]
    fn replace_keeps_position_of_first_match() {
        let mut extensions = list(json!([
            {"url": "a"},
            {"url": "x", "valueString": "1"},
            {"url": "b"},
            {"url": "x", "valueString": "2"}
        ]));
        replace_all(&mut extensions, "x", vec![json!({"url": "x", "valueString": "3"})]);
        assert_eq!(
            extensions,
            list(json!([{"url": "a"}, {"url": "x", "valueString": "3"}, {"url": "b"}]))
        );
    }

    #[test]
    fn replace_appends_when_absent() {
        let mut extensions = list(json!([{"url": "a"}]));
        replace_all(&mut extensions, "x", vec![json!({"url": "x"})]);
        assert_eq!(extensions, list(json!([{"url": "a"}, {"url": "x"}])));
    }

    #[test]
    fn unchanged_item_is_untouched() {
        let original = list(json!([
            {"url": "http://example.org/other", "valueString": "keep"},
            {"url": crate::urls::HIDDEN, "valueBoolean": true, "id": "h"},
            {"url": crate::urls::OBSERVATION_LINK_PERIOD, "valueDuration": {"value": 2, "unit": "months", "system": "http://unitsofmeasure.org", "code": "mo"}},
            "garbage"
        ]));
        let mut state = ItemState::default();
        decode_item(&original, &mut state);
        assert!(state.hidden);

        let mut extensions = original.clone();
        encode_item(&mut extensions, &state, &CodecContext::default());
        assert_eq!(extensions, original);
    }
}
