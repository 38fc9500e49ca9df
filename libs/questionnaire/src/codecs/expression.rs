//! Expression-valued extensions: answer, calculated and initial
//! expressions on items, variables on the questionnaire.
//!
//! All four are multi-valued: one extension per expression, in order.

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Expression, Extension, TypedValue};
use serde_json::Value;

fn decode_expressions(extensions: &[Value], url: &str) -> Vec<Expression> {
    super::matching(extensions, url)
        .filter_map(|e| match e.value {
            Some(TypedValue::Expression(expression)) => Some(expression),
            _ => None,
        })
        .collect()
}

fn build_expressions(expressions: &[Expression], url: &str) -> Vec<Extension> {
    expressions
        .iter()
        .filter(|e| e.is_set())
        .map(|e| {
            let mut expression = e.clone();
            if expression.language.as_deref().map_or(true, str::is_empty) {
                expression.language = Some(Expression::FHIRPATH.to_string());
            }
            Extension::with_value(url, TypedValue::Expression(expression))
        })
        .collect()
}

macro_rules! expression_codec {
    ($(#[$meta:meta])* $name:ident, $url:expr) => {
        $(#[$meta])*
        pub struct $name;

        impl ExtensionCodec for $name {
            type Value = Vec<Expression>;

            const URL: &'static str = $url;

            fn decode(extensions: &[Value]) -> Vec<Expression> {
                decode_expressions(extensions, Self::URL)
            }

            fn build(expressions: &Vec<Expression>, _: &CodecContext<'_>) -> Vec<Extension> {
                build_expressions(expressions, Self::URL)
            }
        }
    };
}

expression_codec!(
    /// `sdc-questionnaire-answerExpression`
    AnswerExpression,
    urls::ANSWER_EXPRESSION
);
expression_codec!(
    /// `sdc-questionnaire-calculatedExpression`
    CalculatedExpression,
    urls::CALCULATED_EXPRESSION
);
expression_codec!(
    /// `sdc-questionnaire-initialExpression`
    InitialExpression,
    urls::INITIAL_EXPRESSION
);
expression_codec!(
    /// `variable`
    Variable,
    urls::VARIABLE
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expression(description: &str, text: &str) -> Expression {
        Expression {
            description: Some(description.to_string()),
            expression: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn answer_expression_defaults_language() {
        let mut extensions = Vec::new();
        AnswerExpression::encode(&mut extensions, &vec![expression("d", "e")], &CodecContext::default());
        assert_eq!(
            extensions,
            vec![json!({
                "url": urls::ANSWER_EXPRESSION,
                "valueExpression": {"description": "d", "expression": "e", "language": "text/fhirpath"}
            })]
        );
    }

    #[test]
    fn cleared_expression_removes_extension() {
        let mut extensions = vec![json!({
            "url": urls::CALCULATED_EXPRESSION,
            "valueExpression": {"description": "d", "expression": "e", "language": "text/fhirpath"}
        })];
        let cleared = vec![Expression {
            language: None,
            ..expression("", "")
        }];
        CalculatedExpression::encode(&mut extensions, &cleared, &CodecContext::default());
        assert!(extensions.is_empty());
    }

    #[test]
    fn variables_keep_order_and_names() {
        let raw = vec![
            json!({"url": urls::VARIABLE, "valueExpression": {"name": "a", "language": "text/fhirpath", "expression": "1"}}),
            json!({"url": urls::LAUNCH_CONTEXT}),
            json!({"url": urls::VARIABLE, "valueExpression": {"name": "b", "language": "text/x-fhir-query", "expression": "Patient?"}}),
        ];
        let variables = Variable::decode(&raw);
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[1].language.as_deref(), Some("text/x-fhir-query"));

        let mut reordered = vec![variables[1].clone(), variables[0].clone()];
        reordered[0].name = Some("c".to_string());
        let mut extensions = raw.clone();
        Variable::encode(&mut extensions, &reordered, &CodecContext::default());
        assert_eq!(extensions[0]["valueExpression"]["name"], json!("c"));
        assert_eq!(extensions[1]["valueExpression"]["name"], json!("a"));
        assert_eq!(extensions[2], json!({"url": urls::LAUNCH_CONTEXT}));
    }
}
