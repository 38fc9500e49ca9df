//! Internal editing model
//!
//! A lifted questionnaire keeps every raw FHIR member it does not
//! interpret in `data` maps, in document order. Members the builder owns
//! (`linkId`, `item`, `enableWhen`) are held in typed form and leave a
//! `null` placeholder in `data` so lowering can put them back where they
//! were. Extension-backed fields are decoded into [`ItemState`] and
//! [`DocumentState`] while the raw extension list stays in `data`.

use crate::codecs::help;
use crate::codecs::{ExtractionContext, ItemSource, LaunchContext, LinkPeriod, UseContextValue};
use crate::tree::{ItemTree, NodeId};
use ferrum_models::{Coding, EnableWhenOperator, Expression, QuestionnaireItemType, TypedValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A lifted Questionnaire
#[derive(Debug, Clone, Default)]
pub struct EditorDocument {
    /// Root members other than the items
    pub data: Map<String, Value>,
    pub tree: ItemTree,
    pub state: DocumentState,
}

impl EditorDocument {
    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(Value::as_str)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.data.insert("title".to_string(), Value::String(title.into()));
    }

    pub fn status(&self) -> Option<&str> {
        self.data.get("status").and_then(Value::as_str)
    }

    /// Record the type chosen for `identifier[index]`
    pub fn set_identifier_type(&mut self, index: usize, coding: Option<Coding>) {
        match coding {
            Some(coding) => {
                self.state.identifier_types.insert(index, coding);
            }
            None => {
                self.state.identifier_types.remove(&index);
            }
        }
    }
}

/// Document-level fields backed by extensions or `useContext`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    pub use_context: Option<UseContextValue>,
    pub launch_context: Vec<LaunchContext>,
    pub variables: Vec<Expression>,
    pub extraction_context: ExtractionContext,
    pub terminology_server: String,
    /// Pending `identifier[i].type` values, applied on lowering
    pub identifier_types: BTreeMap<usize, Coding>,
}

/// Item-level fields backed by extensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemState {
    /// The folded help item, kept whole
    pub help: Option<Map<String, Value>>,
    /// Carries its own hidden extension. Use [`ItemTree::set_hidden`] to
    /// change it so descendants follow.
    pub hidden: bool,
    pub(crate) hidden_effective: bool,
    pub observation_link_period: Option<LinkPeriod>,
    pub observation_extract: bool,
    pub extraction_context: ExtractionContext,
    pub answer_expressions: Vec<Expression>,
    pub calculated_expressions: Vec<Expression>,
    pub initial_expressions: Vec<Expression>,
    pub sources: Vec<ItemSource>,
    pub terminology_server: String,
}

impl ItemState {
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_ref()?.get("text")?.as_str()
    }
}

/// Target of an enableWhen condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionRef {
    /// A live item; lowers to its current linkId
    Node(NodeId),
    /// Not resolvable (unknown, or the target was removed)
    LinkId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnableWhen {
    pub question: Option<QuestionRef>,
    pub operator: Option<EnableWhenOperator>,
    pub answer: Option<TypedValue>,
    /// Other members, including an unrecognised `operator`
    pub other: Map<String, Value>,
}

impl EnableWhen {
    pub fn new(question: NodeId, operator: EnableWhenOperator, answer: Option<TypedValue>) -> Self {
        Self {
            question: Some(QuestionRef::Node(question)),
            operator: Some(operator),
            answer,
            other: Map::new(),
        }
    }

    pub(crate) fn from_json(condition: &Map<String, Value>, tree: &ItemTree) -> Self {
        let mut other = condition.clone();
        let question = match other.get("question") {
            Some(Value::String(link_id)) => {
                let question = match tree.find_by_link_id(link_id) {
                    Some(node) => QuestionRef::Node(node),
                    None => QuestionRef::LinkId(link_id.clone()),
                };
                other.remove("question");
                Some(question)
            }
            _ => None,
        };
        let operator = match other.get("operator").and_then(Value::as_str) {
            Some(code) => match code.parse::<EnableWhenOperator>() {
                Ok(operator) => {
                    other.remove("operator");
                    Some(operator)
                }
                Err(_) => None,
            },
            None => None,
        };
        let answer = TypedValue::remove_prefixed(&mut other, "answer");
        Self {
            question,
            operator,
            answer,
            other,
        }
    }

    pub(crate) fn to_json(&self, tree: &ItemTree) -> Value {
        let mut condition = Map::new();
        if let Some(question) = &self.question {
            let link_id = match question {
                QuestionRef::Node(node) => tree
                    .get(*node)
                    .and_then(ItemNode::link_id)
                    .unwrap_or_default()
                    .to_string(),
                QuestionRef::LinkId(link_id) => link_id.clone(),
            };
            condition.insert("question".to_string(), Value::String(link_id));
        }
        if let Some(operator) = &self.operator {
            condition.insert("operator".to_string(), Value::from(operator.as_str()));
        }
        if let Some(answer) = &self.answer {
            answer.insert_prefixed(&mut condition, "answer");
        }
        for (key, value) in &self.other {
            condition.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(condition)
    }
}

/// One questionnaire item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemNode {
    pub(crate) link_id: Option<String>,
    /// Raw members, with placeholders for `linkId`, `enableWhen` and `item`
    pub data: Map<String, Value>,
    pub enable_when: Vec<EnableWhen>,
    pub state: ItemState,
}

impl ItemNode {
    pub fn new(link_id: impl Into<String>, item_type: QuestionnaireItemType, text: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("linkId".to_string(), Value::Null);
        data.insert("text".to_string(), Value::String(text.into()));
        data.insert("type".to_string(), Value::from(item_type.as_str()));
        Self {
            link_id: Some(link_id.into()),
            data,
            ..Default::default()
        }
    }

    pub fn link_id(&self) -> Option<&str> {
        self.link_id.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.data.get("text").and_then(Value::as_str)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.data.insert("text".to_string(), Value::String(text.into()));
    }

    /// Raw `type` code
    pub fn type_code(&self) -> Option<&str> {
        self.data.get("type").and_then(Value::as_str)
    }

    pub fn item_type(&self) -> Option<QuestionnaireItemType> {
        self.type_code()?.parse().ok()
    }

    pub fn set_item_type(&mut self, item_type: QuestionnaireItemType) {
        self.data
            .insert("type".to_string(), Value::from(item_type.as_str()));
    }

    /// Effective hidden state: own flag or inherited from an ancestor
    pub fn is_hidden(&self) -> bool {
        self.state.hidden_effective
    }

    pub fn help_text(&self) -> Option<&str> {
        self.state.help_text()
    }

    /// linkId of the folded help item, if any
    pub fn help_link_id(&self) -> Option<&str> {
        self.state.help.as_ref()?.get("linkId").and_then(Value::as_str)
    }

    /// Set or clear the help text. An empty text removes the help item.
    pub fn set_help_text(&mut self, text: &str) {
        if text.is_empty() {
            self.state.help = None;
            return;
        }
        match &mut self.state.help {
            Some(help) => {
                help.insert("text".to_string(), Value::from(text));
            }
            None => {
                let parent = self.link_id.as_deref().unwrap_or_default();
                self.state.help = Some(help::help_item(parent, text));
            }
        }
    }

    /// `answer[x]` key for conditions on this item
    pub fn answer_field(&self) -> Option<&'static str> {
        self.item_type()?.answer_field()
    }
}

/// `answer[x]` key for conditions on an item of type `code`
pub fn answer_field_for(code: &str) -> Option<&'static str> {
    code.parse::<QuestionnaireItemType>().ok()?.answer_field()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_item_has_link_id_placeholder() {
        let node = ItemNode::new("q1", QuestionnaireItemType::String, "Name");
        assert_eq!(node.link_id(), Some("q1"));
        assert_eq!(node.data.get("linkId"), Some(&Value::Null));
        assert_eq!(node.item_type(), Some(QuestionnaireItemType::String));
        assert_eq!(node.answer_field(), Some("answerString"));
    }

    #[test]
    fn help_text_lifecycle() {
        let mut node = ItemNode::new("q1", QuestionnaireItemType::String, "Name");
        node.set_help_text("Your full name");
        assert_eq!(node.help_text(), Some("Your full name"));
        assert_eq!(
            node.state.help.as_ref().unwrap()["linkId"],
            json!("q1_intention")
        );

        node.set_help_text("Legal name");
        assert_eq!(node.help_text(), Some("Legal name"));

        node.set_help_text("");
        assert!(node.state.help.is_none());
    }

    #[test]
    fn answer_field_table() {
        assert_eq!(answer_field_for("boolean"), Some("answerBoolean"));
        assert_eq!(answer_field_for("choice"), Some("answerCoding"));
        assert_eq!(answer_field_for("open-choice"), Some("answerCoding"));
        assert_eq!(answer_field_for("group"), None);
        assert_eq!(answer_field_for("bogus"), None);
    }

    #[test]
    fn unknown_operator_is_kept_verbatim() {
        let tree = ItemTree::new();
        let raw = json!({"question": "missing", "operator": "~=", "answerString": "x"});
        let condition = EnableWhen::from_json(raw.as_object().unwrap(), &tree);
        assert_eq!(condition.question, Some(QuestionRef::LinkId("missing".to_string())));
        assert_eq!(condition.operator, None);
        assert_eq!(condition.answer, Some(TypedValue::String("x".to_string())));
        assert_eq!(condition.to_json(&tree), raw);
    }
}
