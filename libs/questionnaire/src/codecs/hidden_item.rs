//! `questionnaire-hidden`

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Extension, TypedValue};
use serde_json::Value;

pub struct HiddenItem;

impl ExtensionCodec for HiddenItem {
    type Value = bool;

    const URL: &'static str = urls::HIDDEN;

    /// Hidden if any hidden extension carries `true`
    fn decode(extensions: &[Value]) -> bool {
        super::matching(extensions, Self::URL)
            .any(|e| e.value.as_ref().and_then(TypedValue::as_bool) == Some(true))
    }

    fn build(hidden: &bool, _: &CodecContext<'_>) -> Vec<Extension> {
        if *hidden {
            vec![Extension::with_value(Self::URL, TypedValue::Boolean(true))]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_only_true() {
        let mut extensions = Vec::new();
        HiddenItem::encode(&mut extensions, &true, &CodecContext::default());
        assert_eq!(
            extensions,
            vec![json!({"url": urls::HIDDEN, "valueBoolean": true})]
        );

        HiddenItem::encode(&mut extensions, &false, &CodecContext::default());
        assert!(extensions.is_empty());
    }

    #[test]
    fn explicit_false_survives_until_toggled() {
        let original = vec![json!({"url": urls::HIDDEN, "valueBoolean": false})];
        assert!(!HiddenItem::decode(&original));

        let mut extensions = original.clone();
        HiddenItem::encode(&mut extensions, &false, &CodecContext::default());
        assert_eq!(extensions, original);

        HiddenItem::encode(&mut extensions, &true, &CodecContext::default());
        assert_eq!(
            extensions,
            vec![json!({"url": urls::HIDDEN, "valueBoolean": true})]
        );
        HiddenItem::encode(&mut extensions, &false, &CodecContext::default());
        assert!(extensions.is_empty());
    }
}
