//! Item arena
//!
//! Items live in slots addressed by [`NodeId`]. Parent/child links and
//! enableWhen targets are ids, never references, so the tree can be
//! edited freely and cloned cheaply. The tree owns the [`LinkIdIndex`]
//! and refuses any edit that would give two items the same linkId.

use crate::codecs::help;
use crate::error::{Error, Result};
use crate::linkid::LinkIdIndex;
use crate::model::{ItemNode, QuestionRef};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an inserted or moved item goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before(NodeId),
    After(NodeId),
    FirstChild(NodeId),
    LastChild(NodeId),
    /// Top level, at the given index (clamped)
    Root(usize),
}

#[derive(Debug, Clone)]
struct Slot {
    node: ItemNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemTree {
    slots: Vec<Option<Slot>>,
    roots: Vec<NodeId>,
    index: LinkIdIndex,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&ItemNode> {
        self.slot(id).map(|s| &s.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ItemNode> {
        self.slot_mut(id).map(|s| &mut s.node)
    }

    pub fn node(&self, id: NodeId) -> Result<&ItemNode> {
        self.get(id).ok_or(Error::UnknownNode(id.0))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut ItemNode> {
        self.get_mut(id).ok_or(Error::UnknownNode(id.0))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn link_ids(&self) -> &LinkIdIndex {
        &self.index
    }

    pub fn find_by_link_id(&self, link_id: &str) -> Option<NodeId> {
        self.index.resolve(link_id)
    }

    /// Every item, depth first, parents before children
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.slots.len());
        for root in &self.roots {
            self.collect_subtree(*root, &mut out);
        }
        out
    }

    /// `id` and its descendants, depth first
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    /// True if `candidate` is `ancestor` or below it
    pub fn is_within(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn insert(&mut self, position: Position, node: ItemNode) -> Result<NodeId> {
        let (parent, at) = self.resolve_position(position)?;
        for link_id in [node.link_id(), node.help_link_id()].into_iter().flatten() {
            if !link_id.is_empty() && self.link_id_taken(link_id, None) {
                return Err(Error::DuplicateLinkId(link_id.to_string()));
            }
        }
        let id = self.alloc(node);
        self.register(id)?;
        self.attach(id, parent, at);
        self.propagate_hidden_from(id);
        Ok(id)
    }

    /// Append under `parent` without recomputing hidden state.
    pub(crate) fn push(&mut self, parent: Option<NodeId>, node: ItemNode) -> Result<NodeId> {
        let id = self.alloc(node);
        if let Err(err) = self.register(id) {
            self.slots[id.0] = None;
            return Err(err);
        }
        let at = match parent {
            Some(p) => self.children(p).len(),
            None => self.roots.len(),
        };
        self.attach(id, parent, at);
        Ok(id)
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::UnknownNode(id.0));
        }
        let target = match position {
            Position::Before(anchor)
            | Position::After(anchor)
            | Position::FirstChild(anchor)
            | Position::LastChild(anchor) => Some(anchor),
            Position::Root(_) => None,
        };
        if let Some(target) = target {
            if !self.contains(target) {
                return Err(Error::UnknownNode(target.0));
            }
            if self.is_within(id, target) {
                return Err(Error::InvalidMove(format!(
                    "cannot move {} relative to itself or its descendant {}",
                    id, target
                )));
            }
        }

        self.detach(id);
        let (parent, at) = self.resolve_position(position)?;
        self.attach(id, parent, at);
        self.propagate_hidden_from(id);
        tracing::debug!(node = %id, ?parent, "Moved item");
        Ok(())
    }

    /// Deep-copy `id` and its descendants to `position`.
    ///
    /// Every copied item gets a fresh linkId. enableWhen conditions inside
    /// the copy that pointed into the original subtree point into the copy.
    pub fn duplicate(&mut self, id: NodeId, position: Position) -> Result<NodeId> {
        if !self.contains(id) {
            return Err(Error::UnknownNode(id.0));
        }
        let (parent, at) = self.resolve_position(position)?;
        let originals = self.subtree(id);

        let mut reserved = HashSet::new();
        let mut copies: HashMap<NodeId, NodeId> = HashMap::new();
        for original in &originals {
            let mut node = self.node(*original)?.clone();
            let fresh = loop {
                let candidate = self.index.fresh_link_id(&reserved);
                let candidate_help = help::help_link_id(&candidate);
                if !self.link_id_taken(&candidate, None)
                    && !self.link_id_taken(&candidate_help, None)
                    && !reserved.contains(&candidate_help)
                {
                    reserved.insert(candidate_help);
                    break candidate;
                }
            };
            reserved.insert(fresh.clone());
            relink_help(&mut node, &fresh);
            node.link_id = Some(fresh);
            let copy = self.alloc(node);
            copies.insert(*original, copy);
        }

        for original in &originals {
            let copy = copies[original];
            let children: Vec<NodeId> = self
                .children(*original)
                .iter()
                .map(|child| copies[child])
                .collect();
            for child in &children {
                if let Some(slot) = self.slot_mut(*child) {
                    slot.parent = Some(copy);
                }
            }
            if let Some(slot) = self.slot_mut(copy) {
                slot.children = children;
                for condition in &mut slot.node.enable_when {
                    if let Some(QuestionRef::Node(target)) = &condition.question {
                        if let Some(mapped) = copies.get(target) {
                            condition.question = Some(QuestionRef::Node(*mapped));
                        }
                    }
                }
            }
            self.register(copy)?;
        }

        let root = copies[&id];
        self.attach(root, parent, at);
        self.propagate_hidden_from(root);
        tracing::debug!(source = %id, copy = %root, items = originals.len(), "Duplicated items");
        Ok(root)
    }

    /// Remove `id` and its descendants, returning them in depth-first order.
    ///
    /// Conditions elsewhere that targeted a removed item keep its last
    /// linkId as a dangling reference.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<ItemNode>> {
        if !self.contains(id) {
            return Err(Error::UnknownNode(id.0));
        }
        let removed_ids = self.subtree(id);
        self.detach(id);

        let mut last_link_ids = HashMap::new();
        let mut removed = Vec::with_capacity(removed_ids.len());
        for rid in &removed_ids {
            if let Some(slot) = self.slots[rid.0].take() {
                if let Some(link_id) = slot.node.link_id() {
                    self.index.remove(link_id);
                    last_link_ids.insert(*rid, link_id.to_string());
                }
                removed.push(slot.node);
            }
        }

        let mut dangling = 0usize;
        for slot in self.slots.iter_mut().flatten() {
            for condition in &mut slot.node.enable_when {
                if let Some(QuestionRef::Node(target)) = &condition.question {
                    if removed_ids.contains(target) {
                        let link_id = last_link_ids.get(target).cloned().unwrap_or_default();
                        condition.question = Some(QuestionRef::LinkId(link_id));
                        dangling += 1;
                    }
                }
            }
        }
        if dangling > 0 {
            tracing::warn!(
                node = %id,
                dangling,
                "Removed items are still referenced by enableWhen conditions"
            );
        }
        Ok(removed)
    }

    /// Change an item's linkId. An empty linkId unregisters the item.
    ///
    /// A folded help item follows as `<linkId>_intention`. Fails without
    /// changes when either linkId is used by another item or help item.
    pub fn rename(&mut self, id: NodeId, link_id: &str) -> Result<()> {
        let node = self.node(id)?;
        let old = node.link_id.clone();
        if old.as_deref() == Some(link_id) {
            return Ok(());
        }
        if !link_id.is_empty() {
            if self.link_id_taken(link_id, Some(id)) {
                return Err(Error::DuplicateLinkId(link_id.to_string()));
            }
            if node.state.help.is_some() {
                let help_link_id = help::help_link_id(link_id);
                if self.link_id_taken(&help_link_id, Some(id)) {
                    return Err(Error::DuplicateLinkId(help_link_id));
                }
            }
        }
        match (old.as_deref().filter(|l| !l.is_empty()), link_id.is_empty()) {
            (Some(old), false) => self.index.rename(old, link_id)?,
            (Some(old), true) => {
                self.index.remove(old);
            }
            (None, false) => self.index.add(link_id, id)?,
            (None, true) => {}
        }
        let node = self.node_mut(id)?;
        if !link_id.is_empty() {
            relink_help(node, link_id);
        }
        node.link_id = (!link_id.is_empty()).then(|| link_id.to_string());
        Ok(())
    }

    /// Set or clear an item's help text. A new help item takes the linkId
    /// `<linkId>_intention`, which must not be in use.
    pub fn set_help_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        let node = self.node(id)?;
        if !text.is_empty() && node.state.help.is_none() {
            let help_link_id = help::help_link_id(node.link_id().unwrap_or_default());
            if self.link_id_taken(&help_link_id, Some(id)) {
                return Err(Error::DuplicateLinkId(help_link_id));
            }
        }
        self.node_mut(id)?.set_help_text(text);
        Ok(())
    }

    /// Whether an item other than `owner`, or a help item not folded into
    /// `owner`, already uses `link_id`
    fn link_id_taken(&self, link_id: &str, owner: Option<NodeId>) -> bool {
        if self
            .index
            .resolve(link_id)
            .is_some_and(|holder| Some(holder) != owner)
        {
            return true;
        }
        self.slots.iter().enumerate().any(|(i, slot)| {
            slot.as_ref().is_some_and(|slot| {
                Some(NodeId(i)) != owner && slot.node.help_link_id() == Some(link_id)
            })
        })
    }

    /// Items a condition on `focused` may reference: every answerable item
    /// outside the focused subtree.
    pub fn enable_when_sources(&self, focused: Option<NodeId>) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|id| focused.map_or(true, |f| !self.is_within(f, *id)))
            .filter(|id| {
                self.get(*id)
                    .and_then(ItemNode::item_type)
                    .is_some_and(|t| !t.is_structural())
            })
            .collect()
    }

    /// linkIds of items with a condition on `link_id`, in tree order
    pub fn dependents_of(&self, link_id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in self.walk() {
            let Some(node) = self.get(id) else { continue };
            let depends = node.enable_when.iter().any(|c| match &c.question {
                Some(QuestionRef::Node(target)) => {
                    self.get(*target).and_then(ItemNode::link_id) == Some(link_id)
                }
                Some(QuestionRef::LinkId(target)) => target == link_id,
                None => false,
            });
            if let (true, Some(own)) = (depends, node.link_id()) {
                if seen.insert(own.to_string()) {
                    out.push(own.to_string());
                }
            }
        }
        out
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0)?.as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.children(id) {
            self.collect_subtree(*child, out);
        }
    }

    fn alloc(&mut self, node: ItemNode) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Slot {
            node,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn register(&mut self, id: NodeId) -> Result<()> {
        let link_id = self
            .get(id)
            .and_then(ItemNode::link_id)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        match link_id {
            Some(link_id) => self.index.add(&link_id, id),
            None => Ok(()),
        }
    }

    fn resolve_position(&self, position: Position) -> Result<(Option<NodeId>, usize)> {
        let sibling_slot = |anchor: NodeId| -> Result<(Option<NodeId>, usize)> {
            let parent = self.slot(anchor).ok_or(Error::UnknownNode(anchor.0))?.parent;
            let siblings = match parent {
                Some(p) => self.children(p),
                None => self.roots.as_slice(),
            };
            let at = siblings
                .iter()
                .position(|s| *s == anchor)
                .ok_or(Error::UnknownNode(anchor.0))?;
            Ok((parent, at))
        };
        match position {
            Position::Before(anchor) => sibling_slot(anchor),
            Position::After(anchor) => sibling_slot(anchor).map(|(p, at)| (p, at + 1)),
            Position::FirstChild(parent) => {
                self.node(parent)?;
                Ok((Some(parent), 0))
            }
            Position::LastChild(parent) => {
                self.node(parent)?;
                Ok((Some(parent), self.children(parent).len()))
            }
            Position::Root(at) => Ok((None, at.min(self.roots.len()))),
        }
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>, at: usize) {
        let siblings = match parent {
            Some(p) => match self.slot_mut(p) {
                Some(slot) => &mut slot.children,
                None => return,
            },
            None => &mut self.roots,
        };
        let at = at.min(siblings.len());
        siblings.insert(at, id);
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = parent;
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.parent(id);
        let siblings = match parent {
            Some(p) => match self.slot_mut(p) {
                Some(slot) => &mut slot.children,
                None => return,
            },
            None => &mut self.roots,
        };
        siblings.retain(|s| *s != id);
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = None;
        }
    }
}

/// Give a folded help item the linkId derived from its parent's new one.
fn relink_help(node: &mut ItemNode, new_link_id: &str) {
    if let Some(help_item) = &mut node.state.help {
        help_item.insert(
            "linkId".to_string(),
            serde_json::Value::String(help::help_link_id(new_link_id)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnableWhen;
    use ferrum_models::{EnableWhenOperator, QuestionnaireItemType, TypedValue};

    fn item(link_id: &str) -> ItemNode {
        ItemNode::new(link_id, QuestionnaireItemType::String, link_id.to_uppercase())
    }

    fn group(link_id: &str) -> ItemNode {
        ItemNode::new(link_id, QuestionnaireItemType::Group, link_id.to_uppercase())
    }

    fn link_ids(tree: &ItemTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| tree.get(*id).and_then(ItemNode::link_id).unwrap_or_default().to_string())
            .collect()
    }

    /// g(a, b), c
    fn sample() -> (ItemTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = ItemTree::new();
        let g = tree.insert(Position::Root(0), group("g")).unwrap();
        let a = tree.insert(Position::LastChild(g), item("a")).unwrap();
        let b = tree.insert(Position::LastChild(g), item("b")).unwrap();
        let c = tree.insert(Position::Root(1), item("c")).unwrap();
        (tree, g, a, b, c)
    }

    #[test]
    fn insert_positions() {
        let (mut tree, g, a, b, c) = sample();
        let before_b = tree.insert(Position::Before(b), item("x")).unwrap();
        let first = tree.insert(Position::FirstChild(g), item("y")).unwrap();
        let after_c = tree.insert(Position::After(c), item("z")).unwrap();

        assert_eq!(tree.children(g), &[first, a, before_b, b]);
        assert_eq!(tree.roots(), &[g, c, after_c]);
        assert_eq!(tree.parent(before_b), Some(g));
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn insert_rejects_duplicate_link_id() {
        let (mut tree, _, _, _, _) = sample();
        let err = tree.insert(Position::Root(0), item("a")).unwrap_err();
        assert!(matches!(err, Error::DuplicateLinkId(id) if id == "a"));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let (mut tree, g, a, _, _) = sample();
        assert!(matches!(
            tree.move_node(g, Position::LastChild(a)),
            Err(Error::InvalidMove(_))
        ));
        assert!(matches!(
            tree.move_node(g, Position::Before(g)),
            Err(Error::InvalidMove(_))
        ));
    }

    #[test]
    fn move_reorders_and_reparents() {
        let (mut tree, g, a, b, c) = sample();
        tree.move_node(c, Position::FirstChild(g)).unwrap();
        assert_eq!(tree.children(g), &[c, a, b]);
        assert_eq!(tree.roots(), &[g]);

        tree.move_node(a, Position::Root(5)).unwrap();
        assert_eq!(tree.roots(), &[g, a]);
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn duplicate_regenerates_link_ids_and_remaps_conditions() {
        let (mut tree, g, a, b, _) = sample();
        tree.node_mut(b).unwrap().enable_when.push(EnableWhen::new(
            a,
            EnableWhenOperator::Equal,
            Some(TypedValue::String("yes".to_string())),
        ));
        let before: HashSet<String> = link_ids(&tree, &tree.walk()).into_iter().collect();

        let copy = tree.duplicate(g, Position::After(g)).unwrap();
        let copied = tree.subtree(copy);
        assert_eq!(copied.len(), 3);

        let new_ids: HashSet<String> = link_ids(&tree, &copied).into_iter().collect();
        assert_eq!(new_ids.len(), 3);
        assert!(new_ids.is_disjoint(&before));

        let copied_b = copied[2];
        let copied_a = copied[1];
        assert_eq!(
            tree.node(copied_b).unwrap().enable_when[0].question,
            Some(QuestionRef::Node(copied_a))
        );
        assert_eq!(
            tree.node(b).unwrap().enable_when[0].question,
            Some(QuestionRef::Node(a))
        );
        for id in copied {
            let link_id = tree.node(id).unwrap().link_id().unwrap().to_string();
            assert_eq!(tree.find_by_link_id(&link_id), Some(id));
        }
    }

    #[test]
    fn duplicate_moves_help_link_id_along() {
        let (mut tree, _, a, _, _) = sample();
        tree.set_help_text(a, "help").unwrap();
        let copy = tree.duplicate(a, Position::After(a)).unwrap();
        let node = tree.node(copy).unwrap();
        let expected = format!("{}_intention", node.link_id().unwrap());
        assert_eq!(
            node.state.help.as_ref().unwrap()["linkId"].as_str(),
            Some(expected.as_str())
        );
    }

    #[test]
    fn remove_leaves_dangling_link_id() {
        let (mut tree, g, a, _, c) = sample();
        tree.node_mut(c).unwrap().enable_when.push(EnableWhen::new(
            a,
            EnableWhenOperator::Exists,
            Some(TypedValue::Boolean(true)),
        ));

        let removed = tree.remove(g).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(tree.find_by_link_id("a"), None);
        assert_eq!(tree.roots(), &[c]);
        assert_eq!(
            tree.node(c).unwrap().enable_when[0].question,
            Some(QuestionRef::LinkId("a".to_string()))
        );
        assert!(matches!(tree.remove(g), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn rename_updates_index() {
        let (mut tree, _, a, b, _) = sample();
        assert!(matches!(tree.rename(a, "b"), Err(Error::DuplicateLinkId(_))));
        tree.rename(a, "a2").unwrap();
        assert_eq!(tree.find_by_link_id("a2"), Some(a));
        assert_eq!(tree.find_by_link_id("a"), None);

        tree.rename(b, "").unwrap();
        assert_eq!(tree.node(b).unwrap().link_id(), None);
        assert_eq!(tree.find_by_link_id("b"), None);
    }

    #[test]
    fn help_link_ids_are_reserved() {
        let (mut tree, _, a, b, c) = sample();
        tree.set_help_text(a, "help").unwrap();

        assert!(matches!(tree.rename(b, "a_intention"), Err(Error::DuplicateLinkId(id)) if id == "a_intention"));
        assert_eq!(tree.node(b).unwrap().link_id(), Some("b"));
        assert!(matches!(
            tree.insert(Position::Root(0), item("a_intention")),
            Err(Error::DuplicateLinkId(_))
        ));

        tree.rename(c, "b_intention").unwrap();
        assert!(matches!(tree.set_help_text(b, "more"), Err(Error::DuplicateLinkId(id)) if id == "b_intention"));
        assert_eq!(tree.node(b).unwrap().help_text(), None);
    }

    #[test]
    fn rename_carries_any_help_link_id_along() {
        let (mut tree, _, a, _, _) = sample();
        tree.set_help_text(a, "help").unwrap();
        if let Some(help_item) = tree.node_mut(a).unwrap().state.help.as_mut() {
            help_item.insert("linkId".to_string(), serde_json::json!("a-help"));
        }

        tree.rename(a, "a2").unwrap();
        assert_eq!(tree.node(a).unwrap().help_link_id(), Some("a2_intention"));
    }

    #[test]
    fn duplicate_relinks_non_standard_help() {
        let (mut tree, _, a, _, _) = sample();
        tree.set_help_text(a, "help").unwrap();
        if let Some(help_item) = tree.node_mut(a).unwrap().state.help.as_mut() {
            help_item.insert("linkId".to_string(), serde_json::json!("a-help"));
        }

        let copy = tree.duplicate(a, Position::After(a)).unwrap();
        let node = tree.node(copy).unwrap();
        let expected = format!("{}_intention", node.link_id().unwrap());
        assert_eq!(node.help_link_id(), Some(expected.as_str()));
        assert_eq!(tree.node(a).unwrap().help_link_id(), Some("a-help"));
    }

    #[test]
    fn enable_when_sources_exclude_focus_and_structure() {
        let (tree, g, a, b, c) = sample();
        assert_eq!(tree.enable_when_sources(Some(a)), vec![b, c]);
        assert_eq!(tree.enable_when_sources(Some(g)), vec![c]);
        assert_eq!(tree.enable_when_sources(None), vec![a, b, c]);
    }

    #[test]
    fn dependents_are_deduplicated() {
        let (mut tree, _, a, b, c) = sample();
        for _ in 0..2 {
            tree.node_mut(b).unwrap().enable_when.push(EnableWhen::new(
                a,
                EnableWhenOperator::Exists,
                Some(TypedValue::Boolean(true)),
            ));
        }
        let mut raw = EnableWhen::new(a, EnableWhenOperator::Exists, None);
        raw.question = Some(QuestionRef::LinkId("a".to_string()));
        tree.node_mut(c).unwrap().enable_when.push(raw);

        assert_eq!(tree.dependents_of("a"), vec!["b", "c"]);
        assert!(tree.dependents_of("b").is_empty());
    }
}
