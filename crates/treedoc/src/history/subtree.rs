//! Replacing a whole subtree with an externally produced one.
//!
//! The replacement is a node map containing the target id (the new subtree
//! root) and everything reachable from it. The target keeps its id and its
//! place in the parent; everything below it is swapped out. The previous
//! subtree is kept in the command, so undo and redo are the same swap.

use super::Command;
use crate::document::Document;
use crate::error::{Result, TreeDocError};
use crate::model::{Node, NodeId};
use crate::registry::AncestorRegistry;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ReplaceSubtreeCommand {
    target_id: NodeId,
    /// The subtree that is not currently in the document.
    stashed: HashMap<NodeId, Node>,
}

impl ReplaceSubtreeCommand {
    pub fn new(target_id: impl Into<NodeId>, replacement: HashMap<NodeId, Node>) -> Self {
        Self {
            target_id: target_id.into(),
            stashed: replacement,
        }
    }

    pub fn from_nodes<I>(target_id: impl Into<NodeId>, replacement: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        Self::new(target_id, replacement.into_iter().map(|n| (n.id.clone(), n)).collect())
    }

    fn swap(&mut self, doc: &mut Document) -> Result<()> {
        let previous = swap_subtree(doc, &self.target_id, &self.stashed)?;
        self.stashed = previous;
        Ok(())
    }
}

impl Command for ReplaceSubtreeCommand {
    fn label(&self) -> String {
        "Replace subtree".to_string()
    }

    fn execute(&mut self, doc: &mut Document) -> Result<bool> {
        self.swap(doc)?;
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        self.swap(doc)
    }
}

/// Replaces the subtree at `target_id` with the one rooted at `target_id` in
/// `replacement`, returning the nodes that were removed.
///
/// Nothing is changed when the replacement is malformed: missing target,
/// dangling or repeated child references, or ids already used elsewhere in
/// the document.
pub(crate) fn swap_subtree(
    doc: &mut Document,
    target_id: &str,
    replacement: &HashMap<NodeId, Node>,
) -> Result<HashMap<NodeId, Node>> {
    if !doc.contains(target_id) {
        return Err(TreeDocError::NodeNotFound(target_id.to_string()));
    }
    let incoming = reachable(replacement, target_id)?;

    let mut outgoing: HashSet<NodeId> = doc.descendants(target_id).into_iter().collect();
    outgoing.insert(target_id.to_string());
    if let Some(clash) = incoming
        .iter()
        .find(|id| !outgoing.contains(*id) && doc.contains(id))
    {
        return Err(TreeDocError::InvalidDocument(format!(
            "replacement reuses id {} from outside the subtree",
            clash
        )));
    }

    let is_root = doc.is_root(target_id);
    let parent_id = doc.parent_id(target_id).cloned();
    doc.registry.remove_node(target_id, &doc.nodes);
    let removed: HashMap<NodeId, Node> = outgoing
        .iter()
        .filter_map(|id| doc.nodes.remove(id).map(|node| (id.clone(), node)))
        .collect();

    for id in &incoming {
        if let Some(node) = replacement.get(id) {
            let mut node = node.clone();
            node.metadata.is_root = is_root && id == target_id;
            doc.nodes.insert(id.clone(), node);
        }
    }

    if is_root {
        doc.registry = AncestorRegistry::build(target_id, &doc.nodes);
    } else if let Some(parent_id) = parent_id {
        doc.registry.move_node(target_id, &parent_id, &doc.nodes);
    }

    tracing::debug!(
        node = target_id,
        removed = removed.len(),
        inserted = incoming.len(),
        "replaced subtree"
    );
    Ok(removed)
}

/// Ids reachable from `root_id` in `nodes`, checked for dangling and repeated
/// references.
fn reachable(nodes: &HashMap<NodeId, Node>, root_id: &str) -> Result<Vec<NodeId>> {
    if !nodes.contains_key(root_id) {
        return Err(TreeDocError::InvalidDocument(format!(
            "replacement does not contain {}",
            root_id
        )));
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            return Err(TreeDocError::InvalidDocument(format!(
                "replacement lists {} more than once",
                id
            )));
        }
        let node = nodes.get(id).ok_or_else(|| {
            TreeDocError::InvalidDocument(format!("replacement references missing node {}", id))
        })?;
        stack.extend(node.children.iter().map(String::as_str));
        out.push(id.to_string());
    }
    Ok(out)
}
