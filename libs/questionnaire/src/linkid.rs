//! linkId index and generation
//!
//! Items are identified internally by [`NodeId`]; the index maps each
//! non-empty linkId to the node that carries it. The tree keeps it in sync
//! so that no two nodes ever share a linkId.

use crate::error::{Error, Result};
use crate::tree::NodeId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct LinkIdIndex {
    by_link_id: HashMap<String, NodeId>,
}

impl LinkIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, link_id: &str) -> Option<NodeId> {
        self.by_link_id.get(link_id).copied()
    }

    pub fn contains(&self, link_id: &str) -> bool {
        self.by_link_id.contains_key(link_id)
    }

    pub fn add(&mut self, link_id: &str, node: NodeId) -> Result<()> {
        if self.by_link_id.contains_key(link_id) {
            return Err(Error::DuplicateLinkId(link_id.to_string()));
        }
        self.by_link_id.insert(link_id.to_string(), node);
        Ok(())
    }

    pub fn remove(&mut self, link_id: &str) -> Option<NodeId> {
        self.by_link_id.remove(link_id)
    }

    /// Move `old`'s entry to `new`. Fails without changes if `new` is taken.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.by_link_id.contains_key(new) {
            return Err(Error::DuplicateLinkId(new.to_string()));
        }
        if let Some(node) = self.by_link_id.remove(old) {
            self.by_link_id.insert(new.to_string(), node);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_link_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_link_id.is_empty()
    }

    /// A linkId not present in the index nor in `reserved`
    pub fn fresh_link_id(&self, reserved: &HashSet<String>) -> String {
        loop {
            let candidate = generate_link_id();
            if !self.contains(&candidate) && !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// 48 random bits, hex encoded (12 characters)
pub fn generate_link_id() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    hex::encode(&bytes[..6])
}
