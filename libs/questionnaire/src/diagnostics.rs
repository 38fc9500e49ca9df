//! Non-fatal problems in an edited document

use crate::model::{EditorDocument, ItemNode, QuestionRef};
use crate::tree::NodeId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An enableWhen names a linkId no item carries
    DanglingReference { item: NodeId, question: String },
    /// An item without a linkId cannot be referenced or answered
    EmptyLinkId { item: NodeId },
}

impl Diagnostic {
    pub fn item(&self) -> NodeId {
        match self {
            Diagnostic::DanglingReference { item, .. } | Diagnostic::EmptyLinkId { item } => *item,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DanglingReference { item, question } => write!(
                f,
                "item {} has an enableWhen on '{}', which no item carries",
                item, question
            ),
            Diagnostic::EmptyLinkId { item } => write!(f, "item {} has no linkId", item),
        }
    }
}

pub fn check(doc: &EditorDocument) -> Vec<Diagnostic> {
    let tree = &doc.tree;
    let mut out = Vec::new();
    for id in tree.walk() {
        let Some(node) = tree.get(id) else { continue };
        if node.link_id().map_or(true, str::is_empty) {
            out.push(Diagnostic::EmptyLinkId { item: id });
        }
        for condition in &node.enable_when {
            let dangling = match &condition.question {
                Some(QuestionRef::LinkId(link_id)) if tree.find_by_link_id(link_id).is_none() => {
                    Some(link_id.clone())
                }
                Some(QuestionRef::Node(target)) => match tree.get(*target).and_then(ItemNode::link_id) {
                    Some(_) => None,
                    None => Some(String::new()),
                },
                _ => None,
            };
            if let Some(question) = dangling {
                out.push(Diagnostic::DanglingReference { item: id, question });
            }
        }
    }
    if !out.is_empty() {
        tracing::warn!(count = out.len(), "Questionnaire has unresolved references");
    }
    out
}
