//! # Ancestor Registry
//!
//! A cache mapping every live node id to its ancestor path, ordered from the
//! root down to the immediate parent. The root maps to an empty path.
//!
//! The registry lets the engine answer "who is my parent", "how deep am I" and
//! "is X inside Y" in O(depth) without walking the tree. It is maintained
//! incrementally: every structural mutation updates only the subtree it
//! touched.
//!
//! ## Consistency Audit
//!
//! Incremental maintenance is easy to get subtly wrong, so [`AncestorRegistry::audit`]
//! rebuilds the registry from scratch and reports every divergence. The audit
//! only logs; it never fails an operation.

use crate::model::{Node, NodeId};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorRegistry {
    paths: HashMap<NodeId, Vec<NodeId>>,
}

/// A single mismatch between the incremental registry and a fresh rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryDivergence {
    /// Node is reachable from the root but has no registry entry.
    Missing {
        node_id: NodeId,
        expected: Vec<NodeId>,
    },
    /// Node has an entry but it does not match its real position.
    Stale {
        node_id: NodeId,
        expected: Vec<NodeId>,
        actual: Vec<NodeId>,
    },
    /// Node has an entry but is not reachable from the root.
    Extra { node_id: NodeId },
}

impl fmt::Display for RegistryDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryDivergence::Missing { node_id, expected } => {
                write!(f, "{} missing (expected {:?})", node_id, expected)
            }
            RegistryDivergence::Stale {
                node_id,
                expected,
                actual,
            } => write!(
                f,
                "{} stale (expected {:?}, found {:?})",
                node_id, expected, actual
            ),
            RegistryDivergence::Extra { node_id } => {
                write!(f, "{} registered but unreachable", node_id)
            }
        }
    }
}

impl AncestorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry by a depth-first walk from `root_id`.
    ///
    /// Ids that are referenced but missing from `nodes` are skipped, and a node
    /// reachable twice keeps the path of its first visit.
    pub fn build(root_id: &str, nodes: &HashMap<NodeId, Node>) -> Self {
        let mut registry = Self::new();
        if nodes.contains_key(root_id) {
            registry.assign_subtree(root_id, Vec::new(), nodes);
        }
        registry
    }

    pub fn ancestors(&self, node_id: &str) -> Option<&[NodeId]> {
        self.paths.get(node_id).map(Vec::as_slice)
    }

    pub fn parent_of(&self, node_id: &str) -> Option<&NodeId> {
        self.paths.get(node_id).and_then(|path| path.last())
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.paths.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Registers a single node under an already registered parent.
    pub fn add_node(&mut self, node_id: &str, parent_id: &str) {
        if let Some(path) = self.child_path(parent_id) {
            self.paths.insert(node_id.to_string(), path);
        }
    }

    /// Registers whole subtrees (e.g. a paste) under an already registered parent.
    pub fn add_nodes(&mut self, root_ids: &[NodeId], parent_id: &str, nodes: &HashMap<NodeId, Node>) {
        let Some(path) = self.child_path(parent_id) else {
            return;
        };
        for root_id in root_ids {
            self.assign_subtree(root_id, path.clone(), nodes);
        }
    }

    /// Unregisters a node and every descendant still listed in `nodes`.
    pub fn remove_node(&mut self, node_id: &str, nodes: &HashMap<NodeId, Node>) {
        let mut stack = vec![node_id.to_string()];
        while let Some(id) = stack.pop() {
            self.paths.remove(&id);
            if let Some(node) = nodes.get(&id) {
                stack.extend(node.children.iter().cloned());
            }
        }
    }

    /// Re-derives the paths of a moved node and its whole subtree.
    pub fn move_node(&mut self, node_id: &str, new_parent_id: &str, nodes: &HashMap<NodeId, Node>) {
        if let Some(path) = self.child_path(new_parent_id) {
            self.assign_subtree(node_id, path, nodes);
        }
    }

    /// True if `candidate_ancestor_id` is a strict ancestor of `target_id`.
    pub fn is_descendant(&self, candidate_ancestor_id: &str, target_id: &str) -> bool {
        self.paths
            .get(target_id)
            .is_some_and(|path| path.iter().any(|id| id == candidate_ancestor_id))
    }

    /// Rebuilds from scratch and reports (and logs) every divergence.
    pub fn audit(&self, root_id: &str, nodes: &HashMap<NodeId, Node>) -> Vec<RegistryDivergence> {
        let fresh = Self::build(root_id, nodes);
        let mut divergences = Vec::new();

        for (node_id, expected) in &fresh.paths {
            match self.paths.get(node_id) {
                None => divergences.push(RegistryDivergence::Missing {
                    node_id: node_id.clone(),
                    expected: expected.clone(),
                }),
                Some(actual) if actual != expected => divergences.push(RegistryDivergence::Stale {
                    node_id: node_id.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                }),
                Some(_) => {}
            }
        }
        for node_id in self.paths.keys() {
            if !fresh.paths.contains_key(node_id) {
                divergences.push(RegistryDivergence::Extra {
                    node_id: node_id.clone(),
                });
            }
        }

        divergences.sort_by(|a, b| divergence_key(a).cmp(divergence_key(b)));
        for divergence in &divergences {
            tracing::warn!(%divergence, "ancestor registry diverged from tree");
        }
        divergences
    }

    fn child_path(&self, parent_id: &str) -> Option<Vec<NodeId>> {
        let parent_path = self.paths.get(parent_id)?;
        let mut path = Vec::with_capacity(parent_path.len() + 1);
        path.extend(parent_path.iter().cloned());
        path.push(parent_id.to_string());
        Some(path)
    }

    fn assign_subtree(&mut self, node_id: &str, path: Vec<NodeId>, nodes: &HashMap<NodeId, Node>) {
        let mut stack = vec![(node_id.to_string(), path)];
        let mut seen = std::collections::HashSet::new();
        while let Some((id, path)) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(node) = nodes.get(&id) else {
                continue;
            };
            let mut child_path = path.clone();
            child_path.push(id.clone());
            for child in node.children.iter().rev() {
                stack.push((child.clone(), child_path.clone()));
            }
            self.paths.insert(id, path);
        }
    }
}

fn divergence_key(divergence: &RegistryDivergence) -> &str {
    match divergence {
        RegistryDivergence::Missing { node_id, .. }
        | RegistryDivergence::Stale { node_id, .. }
        | RegistryDivergence::Extra { node_id } => node_id,
    }
}
