//! # Document: the Node Store
//!
//! [`Document`] owns every live node of one outline plus the
//! [`AncestorRegistry`] derived from them. It is the structural source of
//! truth; every action module receives it by `&mut` and leaves it consistent
//! before returning.
//!
//! ## Invariants
//!
//! - Every non-root node id appears in exactly one other node's `children`.
//! - The registry entry of every node equals its real root-to-parent path.
//! - The root carries `isRoot` and is never detached.
//!
//! Soft-deleted nodes do not live here; they are held by the
//! [`DeletionBuffer`](crate::actions::trash::DeletionBuffer) until restored or purged.

use crate::error::{Result, TreeDocError};
use crate::model::{Node, NodeId};
use crate::registry::{AncestorRegistry, RegistryDivergence};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) root_id: NodeId,
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) registry: AncestorRegistry,
}

/// Structural problem found by [`Document::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeProblem {
    /// A child id is listed but no such node exists.
    DanglingChild { parent_id: NodeId, child_id: NodeId },
    /// A node is listed as a child more than once across the tree.
    DuplicateChild { child_id: NodeId },
    /// A stored non-root node is not listed in any children list.
    Unreachable { node_id: NodeId },
    /// The root is listed as somebody's child.
    RootHasParent { parent_id: NodeId },
}

impl fmt::Display for TreeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeProblem::DanglingChild {
                parent_id,
                child_id,
            } => write!(f, "{} lists missing child {}", parent_id, child_id),
            TreeProblem::DuplicateChild { child_id } => {
                write!(f, "{} appears in more than one children list", child_id)
            }
            TreeProblem::Unreachable { node_id } => write!(f, "{} is unreachable", node_id),
            TreeProblem::RootHasParent { parent_id } => {
                write!(f, "root is listed as a child of {}", parent_id)
            }
        }
    }
}

impl Document {
    /// Takes ownership of `nodes` and builds the ancestor registry.
    ///
    /// The root is marked with `isRoot` if it was missing.
    pub fn new(mut nodes: HashMap<NodeId, Node>, root_id: impl Into<NodeId>) -> Result<Self> {
        let root_id = root_id.into();
        let root = nodes
            .get_mut(&root_id)
            .ok_or_else(|| TreeDocError::NodeNotFound(root_id.clone()))?;
        root.metadata.is_root = true;

        let registry = AncestorRegistry::build(&root_id, &nodes);
        Ok(Self {
            root_id,
            nodes,
            registry,
        })
    }

    pub fn from_nodes<I>(nodes: I, root_id: impl Into<NodeId>) -> Result<Self>
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        Self::new(nodes, root_id)
    }

    /// A fresh document: a root with a single empty child to type into.
    pub fn blank() -> Self {
        let first = Node::new("");
        let mut root = Node::new("").with_children([first.id.clone()]);
        root.metadata.is_root = true;
        let root_id = root.id.clone();

        let nodes: HashMap<NodeId, Node> = [(root.id.clone(), root), (first.id.clone(), first)]
            .into_iter()
            .collect();
        let registry = AncestorRegistry::build(&root_id, &nodes);
        Self {
            root_id,
            nodes,
            registry,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root_id == id
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    pub fn registry(&self) -> &AncestorRegistry {
        &self.registry
    }

    pub fn parent_id(&self, id: &str) -> Option<&NodeId> {
        self.registry.parent_of(id)
    }

    pub fn ancestors(&self, id: &str) -> &[NodeId] {
        self.registry.ancestors(id).unwrap_or(&[])
    }

    pub fn children(&self, id: &str) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent id and position of `id` within the parent's children.
    pub fn position(&self, id: &str) -> Option<(NodeId, usize)> {
        let parent_id = self.parent_id(id)?;
        let index = self.nodes.get(parent_id)?.child_index(id)?;
        Some((parent_id.clone(), index))
    }

    pub fn is_descendant(&self, ancestor_id: &str, target_id: &str) -> bool {
        self.registry.is_descendant(ancestor_id, target_id)
    }

    /// Preorder ids of the subtree below `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.children(id).iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current.clone());
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Every live id in document (preorder) order, root first.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = vec![self.root_id.clone()];
        out.extend(self.descendants(&self.root_id));
        out
    }

    /// Connectivity check. An empty result means the tree is well formed.
    pub fn validate(&self) -> Vec<TreeProblem> {
        let mut problems = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        let mut parents: Vec<&Node> = self.nodes.values().collect();
        parents.sort_by(|a, b| a.id.cmp(&b.id));
        for parent in parents {
            for child_id in &parent.children {
                if *child_id == self.root_id {
                    problems.push(TreeProblem::RootHasParent {
                        parent_id: parent.id.clone(),
                    });
                } else if !self.nodes.contains_key(child_id) {
                    problems.push(TreeProblem::DanglingChild {
                        parent_id: parent.id.clone(),
                        child_id: child_id.clone(),
                    });
                } else if !seen.insert(child_id.as_str()) {
                    problems.push(TreeProblem::DuplicateChild {
                        child_id: child_id.clone(),
                    });
                }
            }
        }

        let mut unreachable: Vec<&NodeId> = self
            .nodes
            .keys()
            .filter(|id| **id != self.root_id && !seen.contains(id.as_str()))
            .collect();
        unreachable.sort();
        problems.extend(unreachable.into_iter().map(|id| TreeProblem::Unreachable {
            node_id: id.clone(),
        }));
        problems
    }

    pub fn audit_registry(&self) -> Vec<RegistryDivergence> {
        self.registry.audit(&self.root_id, &self.nodes)
    }

    // --- Primitives used by the action modules ---

    /// Removes `id` from its parent's children. The registry is left untouched.
    pub(crate) fn unlink(&mut self, id: &str) -> Option<(NodeId, usize)> {
        let (parent_id, index) = self.position(id)?;
        self.nodes.get_mut(&parent_id)?.children.remove(index);
        Some((parent_id, index))
    }

    /// Splices `id` into `parent_id`'s children (index clamped) and re-derives
    /// the registry for `id`'s subtree.
    pub(crate) fn link(&mut self, id: &str, parent_id: &str, index: usize) {
        let Some(parent) = self.nodes.get_mut(parent_id) else {
            return;
        };
        let index = index.min(parent.children.len());
        parent.children.insert(index, id.to_string());
        self.registry.move_node(id, parent_id, &self.nodes);
    }

    /// Detaches `id` and reattaches it elsewhere in a single step.
    pub(crate) fn relocate(&mut self, id: &str, new_parent_id: &str, index: usize) -> bool {
        if !self.nodes.contains_key(new_parent_id) {
            return false;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link(id, new_parent_id, index);
        true
    }

    /// Inserts a brand-new childless node under `parent_id` at `index`.
    pub(crate) fn insert_child(&mut self, node: Node, parent_id: &str, index: usize) -> Option<NodeId> {
        let parent = self.nodes.get_mut(parent_id)?;
        let id = node.id.clone();
        let index = index.min(parent.children.len());
        parent.children.insert(index, id.clone());
        self.nodes.insert(id.clone(), node);
        self.registry.add_node(&id, parent_id);
        Some(id)
    }

    /// Removes `id` and its whole subtree from the store, returning the nodes
    /// in preorder. The caller must already have unlinked `id` from its parent.
    pub(crate) fn take_subtree(&mut self, id: &str) -> Vec<Node> {
        self.registry.remove_node(id, &self.nodes);
        let mut taken = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().rev().cloned());
                taken.push(node);
            }
        }
        taken
    }
}
