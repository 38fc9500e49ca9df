//! `QuestionnaireItemSource`: where an item's content comes from

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Extension, TypedValue};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemSource {
    pub source: String,
    pub comment: String,
}

impl ItemSource {
    fn is_set(&self) -> bool {
        !self.source.trim().is_empty() || !self.comment.trim().is_empty()
    }
}

pub struct ItemSourceCodec;

impl ExtensionCodec for ItemSourceCodec {
    type Value = Vec<ItemSource>;

    const URL: &'static str = urls::ITEM_SOURCE;

    fn decode(extensions: &[Value]) -> Vec<ItemSource> {
        super::matching(extensions, Self::URL)
            .map(|e| ItemSource {
                source: e.child_str("source").unwrap_or_default().to_string(),
                comment: e.child_str("comment").unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn build(sources: &Vec<ItemSource>, _: &CodecContext<'_>) -> Vec<Extension> {
        sources
            .iter()
            .filter(|s| s.is_set())
            .map(|s| {
                let mut inner = Vec::new();
                if !s.source.is_empty() {
                    inner.push(Extension::with_value("source", TypedValue::Uri(s.source.clone())));
                }
                if !s.comment.is_empty() {
                    inner.push(Extension::with_value("comment", TypedValue::String(s.comment.clone())));
                }
                Extension::with_children(Self::URL, inner)
            })
            .collect()
    }
}
