//! Lowering: an [`EditorDocument`] back to FHIR Questionnaire JSON
//!
//! Lowering reads the model and builds a new document; the model is left
//! untouched and stays editable.

use crate::codecs::{self, help, identifier, use_context, CodecContext};
use crate::model::{EditorDocument, ItemNode};
use crate::prune;
use crate::tree::{ItemTree, NodeId};
use ferrum_models::QuestionnaireItemType;
use serde_json::{Map, Value};

/// Lower with the built-in unit table.
pub fn to_fhir(doc: &EditorDocument) -> Value {
    to_fhir_with(doc, &CodecContext::default())
}

pub fn to_fhir_with(doc: &EditorDocument, ctx: &CodecContext<'_>) -> Value {
    let mut root = doc.data.clone();

    with_extensions(&mut root, |extensions| {
        codecs::encode_document(extensions, &doc.state, ctx)
    });
    use_context::encode(&mut root, &doc.state.use_context);
    identifier::apply_identifier_types(&mut root, &doc.state.identifier_types);

    let items: Vec<Value> = doc
        .tree
        .roots()
        .iter()
        .filter_map(|id| lower_item(&doc.tree, *id, ctx))
        .collect();
    put_back(&mut root, "item", Value::Array(items));

    let mut out = Value::Object(root);
    prune::prune_internal_and_empty(&mut out);
    tracing::debug!(items = doc.tree.len(), "Lowered questionnaire");
    out
}

fn lower_item(tree: &ItemTree, id: NodeId, ctx: &CodecContext<'_>) -> Option<Value> {
    let node = tree.get(id)?;
    let mut item = node.data.clone();

    if let Some(link_id) = node.link_id() {
        put_back(&mut item, "linkId", Value::from(link_id));
    }

    with_extensions(&mut item, |extensions| {
        codecs::encode_item(extensions, &node.state, ctx)
    });

    let conditions: Vec<Value> = node.enable_when.iter().map(|c| c.to_json(tree)).collect();
    put_back(&mut item, "enableWhen", Value::Array(conditions));

    let mut children: Vec<Value> = tree
        .children(id)
        .iter()
        .filter_map(|child| lower_item(tree, *child, ctx))
        .collect();
    if let Some(help_item) = node.state.help.as_ref().filter(|h| help::has_help_text(h)) {
        children.push(Value::Object(help_item.clone()));
    }

    derive_structural_type(&mut item, node, children.len());
    put_back(&mut item, "item", Value::Array(children));

    Some(Value::Object(item))
}

/// group/display follow the tree shape: group with children, display
/// without.
fn derive_structural_type(item: &mut Map<String, Value>, node: &ItemNode, child_count: usize) {
    if node.item_type().is_some_and(|t| t.is_structural()) {
        let derived = if child_count > 0 {
            QuestionnaireItemType::Group
        } else {
            QuestionnaireItemType::Display
        };
        item.insert("type".to_string(), Value::from(derived.as_str()));
    }
}

/// Write a builder-owned member into its placeholder, or at the end.
fn put_back(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(slot) if slot.is_null() => *slot = value,
        Some(_) => {}
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn with_extensions(map: &mut Map<String, Value>, f: impl FnOnce(&mut Vec<Value>)) {
    match map.get_mut("extension") {
        Some(Value::Array(extensions)) => f(extensions),
        Some(_) => {
            tracing::warn!("Extension member is not an array; codecs skipped");
        }
        None => {
            let mut extensions = Vec::new();
            f(&mut extensions);
            if !extensions.is_empty() {
                map.insert("extension".to_string(), Value::Array(extensions));
            }
        }
    }
}
