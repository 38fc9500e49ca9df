//! `sdc-questionnaire-preferredTerminologyServer`

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Extension, TypedValue};
use serde_json::Value;

pub struct PreferredTerminologyServer;

impl ExtensionCodec for PreferredTerminologyServer {
    type Value = String;

    const URL: &'static str = urls::PREFERRED_TERMINOLOGY_SERVER;

    fn decode(extensions: &[Value]) -> String {
        super::first_matching(extensions, Self::URL)
            .and_then(|e| e.value)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn build(url: &String, _: &CodecContext<'_>) -> Vec<Extension> {
        if url.trim().is_empty() {
            return Vec::new();
        }
        vec![Extension::with_value(Self::URL, TypedValue::Url(url.clone()))]
    }
}
