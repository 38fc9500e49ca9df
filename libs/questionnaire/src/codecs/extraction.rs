//! `sdc-questionnaire-itemExtractionContext`

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Expression, Extension, TypedValue};
use serde_json::Value;

/// Resource type (as a code) or expression extraction is based on.
/// The two forms are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExtractionContext {
    #[default]
    None,
    Code(String),
    Expression(Expression),
}

pub struct ItemExtractionContext;

impl ExtensionCodec for ItemExtractionContext {
    type Value = ExtractionContext;

    const URL: &'static str = urls::ITEM_EXTRACTION_CONTEXT;

    fn decode(extensions: &[Value]) -> ExtractionContext {
        match super::first_matching(extensions, Self::URL).and_then(|e| e.value) {
            Some(TypedValue::Code(code)) => ExtractionContext::Code(code),
            Some(TypedValue::Expression(expression)) => ExtractionContext::Expression(expression),
            _ => ExtractionContext::None,
        }
    }

    fn build(context: &ExtractionContext, _: &CodecContext<'_>) -> Vec<Extension> {
        let value = match context {
            ExtractionContext::Code(code) if !code.trim().is_empty() => {
                TypedValue::Code(code.clone())
            }
            ExtractionContext::Expression(expression) if expression.is_set() => {
                let mut expression = expression.clone();
                expression
                    .language
                    .get_or_insert_with(|| Expression::FHIRPATH.to_string());
                TypedValue::Expression(expression)
            }
            _ => return Vec::new(),
        };
        vec![Extension::with_value(Self::URL, value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn switching_mode_replaces_extension() {
        let mut extensions = vec![
            json!({"url": "http://example.org/a"}),
            json!({"url": urls::ITEM_EXTRACTION_CONTEXT, "valueCode": "Observation"}),
        ];
        assert_eq!(
            ItemExtractionContext::decode(&extensions),
            ExtractionContext::Code("Observation".to_string())
        );

        let context = ExtractionContext::Expression(Expression {
            expression: Some("%patient".to_string()),
            ..Default::default()
        });
        ItemExtractionContext::encode(&mut extensions, &context, &CodecContext::default());
        assert_eq!(
            extensions[1],
            json!({
                "url": urls::ITEM_EXTRACTION_CONTEXT,
                "valueExpression": {"language": "text/fhirpath", "expression": "%patient"}
            })
        );

        ItemExtractionContext::encode(&mut extensions, &ExtractionContext::None, &CodecContext::default());
        assert_eq!(extensions.len(), 1);
    }

    #[test]
    fn blank_code_counts_as_unset() {
        let mut extensions = Vec::new();
        ItemExtractionContext::encode(
            &mut extensions,
            &ExtractionContext::Code("  ".to_string()),
            &CodecContext::default(),
        );
        assert!(extensions.is_empty());
    }
}
