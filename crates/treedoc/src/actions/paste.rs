//! Copying subtrees out of a document and pasting them back in.
//!
//! A [`Fragment`] is a detached forest: a list of root ids plus every node
//! below them. Pasting always assigns fresh ids, so the same fragment can be
//! pasted any number of times.

use crate::document::Document;
use crate::model::{new_node_id, Node, NodeId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub roots: Vec<NodeId>,
    pub nodes: HashMap<NodeId, Node>,
}

impl Fragment {
    /// Copies the subtrees rooted at `ids`. Unknown ids and the root are skipped.
    pub fn copy(doc: &Document, ids: &[NodeId]) -> Self {
        let mut fragment = Fragment::default();
        for id in ids {
            if doc.is_root(id) || !doc.contains(id) || fragment.nodes.contains_key(id) {
                continue;
            }
            fragment.roots.push(id.clone());
            for node_id in std::iter::once(id.clone()).chain(doc.descendants(id)) {
                if let Some(node) = doc.get(&node_id) {
                    let mut node = node.clone();
                    node.metadata.is_root = false;
                    fragment.nodes.insert(node_id, node);
                }
            }
        }
        fragment
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Nodes reachable from the roots, in preorder. `None` when the fragment
    /// is not a forest: a root is missing or repeated, or some node is reached
    /// twice (shared child or cycle). Children pointing outside the fragment
    /// are ignored.
    fn reachable(&self) -> Option<Vec<&NodeId>> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            if !self.nodes.contains_key(root) {
                return None;
            }
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                if !seen.insert(id) {
                    return None;
                }
                order.push(id);
                if let Some(node) = self.nodes.get(id) {
                    stack.extend(node.children.iter().rev().filter(|c| self.nodes.contains_key(*c)));
                }
            }
        }
        Some(order)
    }

    /// Clones the reachable part of the fragment with every id replaced by a
    /// fresh one. Child references that point outside the fragment are dropped.
    fn with_fresh_ids(&self) -> Option<Fragment> {
        let reachable = self.reachable()?;
        let mapping: HashMap<&NodeId, NodeId> = reachable.iter().map(|id| (*id, new_node_id())).collect();

        let nodes = reachable
            .iter()
            .filter_map(|old_id| {
                let new_id = mapping.get(old_id)?.clone();
                let mut node = self.nodes.get(*old_id)?.clone();
                node.id = new_id.clone();
                node.metadata.is_root = false;
                node.children = node
                    .children
                    .iter()
                    .filter_map(|child| mapping.get(child).cloned())
                    .collect();
                Some((new_id, node))
            })
            .collect();
        let roots = self
            .roots
            .iter()
            .filter_map(|root| mapping.get(root).cloned())
            .collect();
        Some(Fragment { roots, nodes })
    }
}

/// Pastes `fragment` under `parent_id` starting at `index` (clamped).
///
/// Returns the ids of the pasted roots in order; empty when the parent is
/// unknown, the fragment is empty, or it is not a forest. Nodes not reachable
/// from the roots are left out.
pub fn paste_fragment(doc: &mut Document, parent_id: &str, index: usize, fragment: &Fragment) -> Vec<NodeId> {
    if !doc.contains(parent_id) || fragment.is_empty() {
        return Vec::new();
    }
    let Some(fresh) = fragment.with_fresh_ids() else {
        tracing::warn!(parent = parent_id, roots = fragment.roots.len(), "refusing to paste a fragment that is not a forest");
        return Vec::new();
    };
    let count = fresh.nodes.len();
    doc.nodes.extend(fresh.nodes);

    let Some(parent) = doc.nodes.get_mut(parent_id) else {
        return Vec::new();
    };
    let index = index.min(parent.children.len());
    parent
        .children
        .splice(index..index, fresh.roots.iter().cloned());
    doc.registry.add_nodes(&fresh.roots, parent_id, &doc.nodes);

    tracing::debug!(parent = parent_id, index, roots = fresh.roots.len(), nodes = count, "pasted fragment");
    fresh.roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{assert_consistent, kids, sample};

    #[test]
    fn test_copy_collects_subtrees() {
        let doc = sample();
        let fragment = Fragment::copy(&doc, &["a".to_string(), "b".to_string()]);
        assert_eq!(fragment.roots, vec!["a", "b"]);
        assert_eq!(fragment.len(), 4);
        assert!(fragment.nodes.contains_key("a2"));
    }

    #[test]
    fn test_copy_skips_root_and_unknown() {
        let doc = sample();
        let fragment = Fragment::copy(&doc, &["root".to_string(), "zzz".to_string()]);
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_paste_inserts_fresh_copies() {
        let mut doc = sample();
        let fragment = Fragment::copy(&doc, &["a".to_string()]);

        let pasted = paste_fragment(&mut doc, "c", 1, &fragment);
        assert_eq!(pasted.len(), 1);
        let copy_id = &pasted[0];
        assert_ne!(copy_id, "a");
        assert_eq!(kids(&doc, "c"), vec!["c1".to_string(), copy_id.clone()]);

        let copy = doc.get(copy_id).unwrap();
        assert_eq!(copy.content, "A");
        assert_eq!(copy.children.len(), 2);
        let grandchild = &copy.children[0];
        assert_eq!(doc.get(grandchild).unwrap().content, "A1");
        assert_eq!(
            doc.ancestors(grandchild),
            &["root".to_string(), "c".to_string(), copy_id.clone()]
        );
        assert_consistent(&doc);
    }

    #[test]
    fn test_paste_twice_gives_distinct_ids() {
        let mut doc = sample();
        let fragment = Fragment::copy(&doc, &["b".to_string()]);
        let first = paste_fragment(&mut doc, "root", 0, &fragment);
        let second = paste_fragment(&mut doc, "root", 0, &fragment);
        assert_ne!(first, second);
        assert_eq!(doc.len(), 9);
        assert_consistent(&doc);
    }

    #[test]
    fn test_paste_drops_dangling_children() {
        let mut doc = sample();
        let mut fragment = Fragment::default();
        fragment.roots.push("x".into());
        fragment
            .nodes
            .insert("x".into(), Node::with_id("x", "X").with_children(["gone"]));

        let pasted = paste_fragment(&mut doc, "b", 0, &fragment);
        assert!(doc.get(&pasted[0]).unwrap().children.is_empty());
        assert_consistent(&doc);
    }

    fn external(roots: &[&str], nodes: Vec<Node>) -> Fragment {
        Fragment {
            roots: roots.iter().map(|r| r.to_string()).collect(),
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }

    #[test]
    fn test_paste_refuses_root_that_is_also_a_child() {
        let mut doc = sample();
        let before = doc.clone();
        let fragment = external(
            &["x", "y"],
            vec![Node::with_id("x", "X").with_children(["y"]), Node::with_id("y", "Y"), Node::with_id("z", "Z")],
        );

        assert!(paste_fragment(&mut doc, "b", 0, &fragment).is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_paste_refuses_cycles_and_repeated_roots() {
        let mut doc = sample();
        let before = doc.clone();
        let cycle = external(
            &["x"],
            vec![Node::with_id("x", "X").with_children(["y"]), Node::with_id("y", "Y").with_children(["x"])],
        );
        assert!(paste_fragment(&mut doc, "b", 0, &cycle).is_empty());

        let repeated = external(&["x", "x"], vec![Node::with_id("x", "X")]);
        assert!(paste_fragment(&mut doc, "b", 0, &repeated).is_empty());

        let missing_root = external(&["nope"], vec![Node::with_id("x", "X")]);
        assert!(paste_fragment(&mut doc, "b", 0, &missing_root).is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_paste_leaves_out_unreachable_nodes() {
        let mut doc = sample();
        let fragment = external(
            &["x"],
            vec![
                Node::with_id("x", "X").with_children(["y"]),
                Node::with_id("y", "Y"),
                Node::with_id("stray", "Stray"),
            ],
        );

        let pasted = paste_fragment(&mut doc, "b", 0, &fragment);
        assert_eq!(pasted.len(), 1);
        assert_eq!(doc.len(), 9);
        assert!(doc.nodes().values().all(|n| n.content != "Stray"));
        assert_consistent(&doc);
    }

    #[test]
    fn test_paste_clears_root_flag_on_external_nodes() {
        let mut doc = sample();
        let mut top = Node::with_id("x", "X");
        top.metadata.is_root = true;
        let pasted = paste_fragment(&mut doc, "b", 0, &external(&["x"], vec![top]));
        assert!(!doc.get(&pasted[0]).unwrap().metadata.is_root);
        assert!(doc.is_root("root"));
    }

    #[test]
    fn test_paste_under_unknown_parent_is_noop() {
        let mut doc = sample();
        let fragment = Fragment::copy(&doc, &["b".to_string()]);
        assert!(paste_fragment(&mut doc, "missing", 0, &fragment).is_empty());
        assert_eq!(doc.len(), 7);
    }
}
