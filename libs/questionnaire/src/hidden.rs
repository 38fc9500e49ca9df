//! Hidden-item propagation
//!
//! An item is hidden when it carries the hidden extension or any ancestor
//! does. The own flag (`ItemState::hidden`) is what lowering writes back;
//! the effective flag is derived and never persisted.

use crate::error::Result;
use crate::model::ItemNode;
use crate::tree::{ItemTree, NodeId};
use crate::urls;
use ferrum_models::url_of;
use serde_json::Value;

impl ItemTree {
    /// Recompute every effective flag from the own flags.
    pub fn propagate_hidden(&mut self) {
        for root in self.roots().to_vec() {
            propagate(self, root, false);
        }
    }

    /// Recompute the flags of `id`'s subtree from its current parent.
    pub(crate) fn propagate_hidden_from(&mut self, id: NodeId) {
        let inherited = self
            .parent(id)
            .and_then(|p| self.get(p))
            .is_some_and(|p| p.is_hidden());
        propagate(self, id, inherited);
    }

    /// Toggle the hidden flag of one item.
    ///
    /// The whole subtree follows the new value. Un-hiding also clears the
    /// own flag of every descendant and drops every hidden extension in the
    /// subtree, including explicit `valueBoolean: false` entries.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        self.node_mut(id)?.state.hidden = hidden;
        for node_id in self.subtree(id) {
            if let Some(node) = self.get_mut(node_id) {
                node.state.hidden_effective = hidden;
                if !hidden {
                    node.state.hidden = false;
                    strip_hidden_extensions(node);
                }
            }
        }
        tracing::debug!(node = %id, hidden, "Toggled hidden item");
        Ok(())
    }
}

fn strip_hidden_extensions(node: &mut ItemNode) {
    let Some(Value::Array(extensions)) = node.data.get_mut("extension") else {
        return;
    };
    let before = extensions.len();
    extensions.retain(|e| url_of(e) != Some(urls::HIDDEN));
    if extensions.len() == before {
        return;
    }
    if extensions.is_empty() {
        node.data.remove("extension");
    }
}

fn propagate(tree: &mut ItemTree, id: NodeId, parent_hidden: bool) {
    let hidden = match tree.get_mut(id) {
        Some(node) => {
            node.state.hidden_effective = node.state.hidden || parent_hidden;
            node.state.hidden_effective
        }
        None => return,
    };
    for child in tree.children(id).to_vec() {
        propagate(tree, child, hidden);
    }
}
