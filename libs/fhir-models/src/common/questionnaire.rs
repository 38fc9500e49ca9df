//! Questionnaire code sets
//!
//! Item types and enableWhen operators of the FHIR R4 Questionnaire
//! resource. The resource itself is edited as JSON by the builder, so
//! only the closed code sets are modelled here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distinguishes groups from questions and display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionnaireItemType {
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "display")]
    Display,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "dateTime")]
    DateTime,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "choice")]
    Choice,
    #[serde(rename = "open-choice")]
    OpenChoice,
    #[serde(rename = "attachment")]
    Attachment,
    #[serde(rename = "reference")]
    Reference,
    #[serde(rename = "quantity")]
    Quantity,
}

impl QuestionnaireItemType {
    pub const ALL: [QuestionnaireItemType; 16] = [
        QuestionnaireItemType::Group,
        QuestionnaireItemType::Display,
        QuestionnaireItemType::Boolean,
        QuestionnaireItemType::Decimal,
        QuestionnaireItemType::Integer,
        QuestionnaireItemType::Date,
        QuestionnaireItemType::DateTime,
        QuestionnaireItemType::Time,
        QuestionnaireItemType::String,
        QuestionnaireItemType::Text,
        QuestionnaireItemType::Url,
        QuestionnaireItemType::Choice,
        QuestionnaireItemType::OpenChoice,
        QuestionnaireItemType::Attachment,
        QuestionnaireItemType::Reference,
        QuestionnaireItemType::Quantity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionnaireItemType::Group => "group",
            QuestionnaireItemType::Display => "display",
            QuestionnaireItemType::Boolean => "boolean",
            QuestionnaireItemType::Decimal => "decimal",
            QuestionnaireItemType::Integer => "integer",
            QuestionnaireItemType::Date => "date",
            QuestionnaireItemType::DateTime => "dateTime",
            QuestionnaireItemType::Time => "time",
            QuestionnaireItemType::String => "string",
            QuestionnaireItemType::Text => "text",
            QuestionnaireItemType::Url => "url",
            QuestionnaireItemType::Choice => "choice",
            QuestionnaireItemType::OpenChoice => "open-choice",
            QuestionnaireItemType::Attachment => "attachment",
            QuestionnaireItemType::Reference => "reference",
            QuestionnaireItemType::Quantity => "quantity",
        }
    }

    /// Group and display are not chosen by the user: they follow from
    /// whether the item has children.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            QuestionnaireItemType::Group | QuestionnaireItemType::Display
        )
    }

    /// `answer[x]` key an enableWhen on an item of this type uses.
    ///
    /// Structural items, urls and attachments cannot be conditioned on.
    pub fn answer_field(&self) -> Option<&'static str> {
        let field = match self {
            QuestionnaireItemType::Group
            | QuestionnaireItemType::Display
            | QuestionnaireItemType::Url
            | QuestionnaireItemType::Attachment => return None,
            QuestionnaireItemType::Boolean => "answerBoolean",
            QuestionnaireItemType::Decimal => "answerDecimal",
            QuestionnaireItemType::Integer => "answerInteger",
            QuestionnaireItemType::Date => "answerDate",
            QuestionnaireItemType::DateTime => "answerDateTime",
            QuestionnaireItemType::Time => "answerTime",
            QuestionnaireItemType::String | QuestionnaireItemType::Text => "answerString",
            QuestionnaireItemType::Choice | QuestionnaireItemType::OpenChoice => "answerCoding",
            QuestionnaireItemType::Reference => "answerReference",
            QuestionnaireItemType::Quantity => "answerQuantity",
        };
        Some(field)
    }
}

impl fmt::Display for QuestionnaireItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionnaireItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown questionnaire item type '{}'", s))
    }
}

/// Comparison operator of an enableWhen condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnableWhenOperator {
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl EnableWhenOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnableWhenOperator::Exists => "exists",
            EnableWhenOperator::Equal => "=",
            EnableWhenOperator::NotEqual => "!=",
            EnableWhenOperator::GreaterThan => ">",
            EnableWhenOperator::LessThan => "<",
            EnableWhenOperator::GreaterOrEqual => ">=",
            EnableWhenOperator::LessOrEqual => "<=",
        }
    }
}

impl FromStr for EnableWhenOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exists" => Ok(EnableWhenOperator::Exists),
            "=" => Ok(EnableWhenOperator::Equal),
            "!=" => Ok(EnableWhenOperator::NotEqual),
            ">" => Ok(EnableWhenOperator::GreaterThan),
            "<" => Ok(EnableWhenOperator::LessThan),
            ">=" => Ok(EnableWhenOperator::GreaterOrEqual),
            "<=" => Ok(EnableWhenOperator::LessOrEqual),
            other => Err(format!("unknown enableWhen operator '{}'", other)),
        }
    }
}

impl fmt::Display for EnableWhenOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_type_codes_match_fhir() {
        for item_type in QuestionnaireItemType::ALL {
            let encoded = serde_json::to_value(item_type).unwrap();
            assert_eq!(encoded, json!(item_type.as_str()));
            assert_eq!(item_type.as_str().parse::<QuestionnaireItemType>(), Ok(item_type));
        }
        assert!("openChoice".parse::<QuestionnaireItemType>().is_err());
    }

    #[test]
    fn answer_field_follows_item_type() {
        assert_eq!(QuestionnaireItemType::Boolean.answer_field(), Some("answerBoolean"));
        assert_eq!(QuestionnaireItemType::OpenChoice.answer_field(), Some("answerCoding"));
        assert_eq!(QuestionnaireItemType::Text.answer_field(), Some("answerString"));
        assert_eq!(QuestionnaireItemType::Group.answer_field(), None);
        assert_eq!(QuestionnaireItemType::Url.answer_field(), None);
    }

    #[test]
    fn operator_codes_match_fhir() {
        let op: EnableWhenOperator = serde_json::from_value(json!(">=")).unwrap();
        assert_eq!(op, EnableWhenOperator::GreaterOrEqual);
        assert_eq!("!=".parse::<EnableWhenOperator>(), Ok(EnableWhenOperator::NotEqual));
        assert!("~".parse::<EnableWhenOperator>().is_err());
    }
}
