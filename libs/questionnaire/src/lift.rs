//! Lifting: raw FHIR Questionnaire JSON into an [`EditorDocument`]

use crate::codecs::{self, help, use_context};
use crate::error::{Error, Result};
use crate::legacy::LegacyConverter;
use crate::linkid::generate_link_id;
use crate::model::{EditorDocument, EnableWhen, ItemNode};
use crate::prune;
use crate::tree::{ItemTree, NodeId, Position};
use ferrum_models::QuestionnaireItemType;
use serde_json::{json, Map, Value};

/// Lift a raw Questionnaire.
///
/// Fails only when the input is not a Questionnaire object or two items
/// share a linkId. Malformed extensions and enableWhen entries degrade to
/// "absent" instead.
pub fn from_fhir(raw: &Value) -> Result<EditorDocument> {
    let root = raw
        .as_object()
        .ok_or_else(|| Error::NotAQuestionnaire("document is not a JSON object".to_string()))?;
    match root.get("resourceType").and_then(Value::as_str) {
        Some("Questionnaire") => {}
        Some(other) => {
            return Err(Error::NotAQuestionnaire(format!(
                "expected resourceType Questionnaire, found {}",
                other
            )))
        }
        None => {
            return Err(Error::NotAQuestionnaire(
                "missing resourceType".to_string(),
            ))
        }
    }

    let mut doc = EditorDocument {
        data: root.clone(),
        ..Default::default()
    };

    let mut pending = Vec::new();
    if let Some(Value::Array(items)) = doc.data.get("item") {
        let items = items.clone();
        doc.data.insert("item".to_string(), Value::Null);
        lift_items(&mut doc.tree, None, &items, &mut pending)?;
    }

    if let Some(Value::Array(extensions)) = doc.data.get("extension") {
        codecs::decode_document(extensions, &mut doc.state);
    }
    doc.state.use_context = use_context::decode(&doc.data);

    for (id, conditions) in pending {
        let resolved: Vec<EnableWhen> = conditions
            .iter()
            .map(|c| EnableWhen::from_json(c, &doc.tree))
            .collect();
        if let Some(node) = doc.tree.get_mut(id) {
            node.enable_when = resolved;
        }
    }

    doc.tree.propagate_hidden();

    tracing::debug!(
        items = doc.tree.len(),
        launch_contexts = doc.state.launch_context.len(),
        variables = doc.state.variables.len(),
        "Lifted questionnaire"
    );
    Ok(doc)
}

fn lift_items(
    tree: &mut ItemTree,
    parent: Option<NodeId>,
    items: &[Value],
    pending: &mut Vec<(NodeId, Vec<Map<String, Value>>)>,
) -> Result<()> {
    for item in items {
        let Some(item) = item.as_object() else {
            if !item.is_null() {
                tracing::warn!(?parent, "Dropping item that is not a JSON object");
            }
            continue;
        };
        let mut node = ItemNode {
            data: item.clone(),
            ..Default::default()
        };

        if let Some(Value::String(link_id)) = node.data.get("linkId") {
            node.link_id = Some(link_id.clone());
            node.data.insert("linkId".to_string(), Value::Null);
        }

        let mut children = Vec::new();
        if let Some(Value::Array(raw_children)) = node.data.get("item") {
            children = raw_children.clone();
            if let Some(pos) = children.iter().position(help::is_help_item) {
                if let Value::Object(help_item) = children.remove(pos) {
                    node.state.help = Some(help_item);
                }
            }
            node.data.insert("item".to_string(), Value::Null);
        }

        let mut conditions = Vec::new();
        if let Some(Value::Array(raw_conditions)) = node.data.get("enableWhen") {
            for condition in raw_conditions {
                match condition {
                    Value::Object(condition) => conditions.push(condition.clone()),
                    other => tracing::warn!(
                        link_id = node.link_id.as_deref().unwrap_or_default(),
                        condition = %other,
                        "Dropping enableWhen entry that is not a JSON object"
                    ),
                }
            }
            node.data.insert("enableWhen".to_string(), Value::Null);
        }

        match node.data.get("extension") {
            Some(Value::Array(extensions)) => codecs::decode_item(extensions, &mut node.state),
            Some(_) => tracing::warn!(
                link_id = node.link_id.as_deref().unwrap_or_default(),
                "Item extension member is not an array; left as is"
            ),
            None => {}
        }

        let id = tree.push(parent, node)?;
        if !conditions.is_empty() {
            pending.push((id, conditions));
        }
        lift_items(tree, Some(id), &children, pending)?;
    }
    Ok(())
}

/// Parse text supplied by the user.
///
/// A FHIR Questionnaire is lifted directly; any other object with a
/// `name` is handed to `legacy` first.
pub fn parse_questionnaire(text: &str, legacy: &dyn LegacyConverter) -> Result<EditorDocument> {
    if text.trim().is_empty() {
        return Err(Error::Parse("empty document".to_string()));
    }
    let value: Value = serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;

    if value.get("resourceType").and_then(Value::as_str) == Some("Questionnaire") {
        return from_fhir(&value);
    }
    if legacy.accepts(&value) {
        tracing::info!(format = legacy.name(), "Converting legacy form");
        let converted = legacy.convert(&value)?;
        return from_fhir(&converted);
    }
    Err(Error::NotAQuestionnaire(
        "neither a FHIR Questionnaire nor a recognised legacy form".to_string(),
    ))
}

/// `{resourceType, status: draft, item: []}`
pub fn skeleton() -> Value {
    json!({
        "resourceType": "Questionnaire",
        "status": "draft",
        "item": []
    })
}

/// New document: the skeleton with one default item
pub fn default_document() -> Result<EditorDocument> {
    let mut doc = from_fhir(&skeleton())?;
    doc.tree.insert(Position::Root(0), default_item())?;
    Ok(doc)
}

/// `{text: "Item 0", type: "string"}` with a fresh linkId
pub fn default_item() -> ItemNode {
    ItemNode::new(generate_link_id(), QuestionnaireItemType::String, "Item 0")
}

/// True when `raw` carries nothing beyond a fresh document.
///
/// The skeleton alone, or the skeleton with its untouched default item,
/// counts as empty; replacing it needs no confirmation.
pub fn is_default_skeleton(raw: &Value) -> bool {
    let mut pruned = raw.clone();
    prune::prune_internal_and_empty(&mut pruned);
    let Some(root) = pruned.as_object() else {
        return false;
    };
    if root.get("resourceType").and_then(Value::as_str) != Some("Questionnaire")
        || root.get("status").and_then(Value::as_str) != Some("draft")
    {
        return false;
    }
    if root.keys().any(|k| !matches!(k.as_str(), "resourceType" | "status" | "item")) {
        return false;
    }
    match root.get("item") {
        None => true,
        Some(Value::Array(items)) => match items.as_slice() {
            [only] => is_default_item(only),
            _ => false,
        },
        Some(_) => false,
    }
}

fn is_default_item(item: &Value) -> bool {
    let Some(item) = item.as_object() else {
        return false;
    };
    item.get("text").and_then(Value::as_str) == Some("Item 0")
        && item.get("type").and_then(Value::as_str) == Some("string")
        && item.keys().all(|k| matches!(k.as_str(), "linkId" | "text" | "type"))
}

/// Copy a document to start a new one from it.
///
/// `id`, `title` and `url` are cleared. With `regenerate_link_ids` every
/// item gets a fresh linkId; conditions between items follow.
pub fn duplicate_document(doc: &EditorDocument, regenerate_link_ids: bool) -> Result<EditorDocument> {
    let mut copy = doc.clone();
    for key in ["id", "title", "url"] {
        copy.data.remove(key);
    }
    if regenerate_link_ids {
        for id in copy.tree.walk() {
            let fresh = copy.tree.link_ids().fresh_link_id(&Default::default());
            copy.tree.rename(id, &fresh)?;
        }
    }
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::LformsConverter;
    use crate::model::QuestionRef;

    #[test]
    fn rejects_non_questionnaire() {
        assert!(matches!(
            from_fhir(&json!({"resourceType": "ValueSet"})),
            Err(Error::NotAQuestionnaire(_))
        ));
        assert!(matches!(from_fhir(&json!([1])), Err(Error::NotAQuestionnaire(_))));
    }

    #[test]
    fn duplicate_link_ids_are_rejected() {
        let raw = json!({
            "resourceType": "Questionnaire",
            "item": [{"linkId": "a", "type": "string"}, {"linkId": "a", "type": "boolean"}]
        });
        assert!(matches!(from_fhir(&raw), Err(Error::DuplicateLinkId(id)) if id == "a"));
    }

    #[test]
    fn help_child_is_folded() {
        let raw = json!({
            "resourceType": "Questionnaire",
            "item": [{
                "linkId": "q",
                "type": "string",
                "item": [help::help_item("q", "Some help")]
            }]
        });
        let doc = from_fhir(&raw).unwrap();
        let q = doc.tree.find_by_link_id("q").unwrap();
        assert!(doc.tree.children(q).is_empty());
        assert_eq!(doc.tree.get(q).unwrap().help_text(), Some("Some help"));
    }

    #[test]
    fn forward_references_resolve() {
        let raw = json!({
            "resourceType": "Questionnaire",
            "item": [
                {"linkId": "a", "type": "string", "enableWhen": [
                    {"question": "b", "operator": "exists", "answerBoolean": true},
                    {"question": "zz", "operator": "exists", "answerBoolean": true},
                    "junk"
                ]},
                {"linkId": "b", "type": "boolean"}
            ]
        });
        let doc = from_fhir(&raw).unwrap();
        let a = doc.tree.find_by_link_id("a").unwrap();
        let b = doc.tree.find_by_link_id("b").unwrap();
        let conditions = &doc.tree.get(a).unwrap().enable_when;
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].question, Some(QuestionRef::Node(b)));
        assert_eq!(conditions[1].question, Some(QuestionRef::LinkId("zz".to_string())));
    }

    #[test]
    fn parse_errors() {
        let legacy = LformsConverter;
        assert!(matches!(parse_questionnaire("  ", &legacy), Err(Error::Parse(_))));
        assert!(matches!(parse_questionnaire("{oops", &legacy), Err(Error::Parse(_))));
        assert!(matches!(
            parse_questionnaire(r#"{"resourceType": "Patient"}"#, &legacy),
            Err(Error::NotAQuestionnaire(_))
        ));
        assert!(parse_questionnaire(r#"{"resourceType": "Questionnaire", "status": "draft"}"#, &legacy).is_ok());
    }

    #[test]
    fn default_document_has_one_item() {
        let doc = default_document().unwrap();
        assert_eq!(doc.tree.roots().len(), 1);
        let item = doc.tree.get(doc.tree.roots()[0]).unwrap();
        assert_eq!(item.text(), Some("Item 0"));
        assert_eq!(item.type_code(), Some("string"));
        assert_eq!(item.link_id().map(str::len), Some(12));
    }

    #[test]
    fn default_skeleton_detection() {
        assert!(is_default_skeleton(&skeleton()));
        assert!(is_default_skeleton(&json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [{"linkId": "abc", "text": "Item 0", "type": "string"}]
        })));
        assert!(!is_default_skeleton(&json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "title": "Intake"
        })));
        assert!(!is_default_skeleton(&json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [{"linkId": "abc", "text": "Weight", "type": "string"}]
        })));
    }

    #[test]
    fn duplicate_document_clears_identity() {
        let raw = json!({
            "resourceType": "Questionnaire",
            "id": "q1",
            "url": "http://example.org/q1",
            "title": "Intake",
            "status": "active",
            "item": [
                {"linkId": "a", "type": "boolean"},
                {"linkId": "b", "type": "string", "enableWhen": [
                    {"question": "a", "operator": "=", "answerBoolean": true}
                ]}
            ]
        });
        let doc = from_fhir(&raw).unwrap();

        let same = duplicate_document(&doc, false).unwrap();
        assert!(same.data.get("id").is_none());
        assert!(same.title().is_none());
        assert!(same.tree.find_by_link_id("a").is_some());

        let fresh = duplicate_document(&doc, true).unwrap();
        assert!(fresh.tree.find_by_link_id("a").is_none());
        let roots = fresh.tree.roots();
        let a = roots[0];
        let b = roots[1];
        assert_eq!(
            fresh.tree.get(b).unwrap().enable_when[0].question,
            Some(QuestionRef::Node(a))
        );
        assert_eq!(doc.tree.get(doc.tree.roots()[0]).unwrap().link_id(), Some("a"));
    }
}
