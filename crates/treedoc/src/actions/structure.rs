//! Reshaping the tree: indent, outdent and move up/down.
//!
//! Every function returns `true` when the tree changed. Unknown ids, the root
//! and tree boundaries are no-ops.

use crate::document::Document;

/// Makes `id` the last child of its immediately preceding sibling.
pub fn indent_node(doc: &mut Document, id: &str) -> bool {
    let Some((parent_id, index)) = doc.position(id) else {
        return false;
    };
    if index == 0 {
        return false;
    }
    let target = doc.children(&parent_id)[index - 1].clone();
    let end = doc.children(&target).len();
    let moved = doc.relocate(id, &target, end);
    if moved {
        tracing::debug!(node = id, parent = %target, "indented node");
    }
    moved
}

/// Moves `id` out of its parent, directly after the parent in the grandparent.
pub fn outdent_node(doc: &mut Document, id: &str) -> bool {
    let Some((parent_id, _)) = doc.position(id) else {
        return false;
    };
    if doc.is_root(&parent_id) {
        return false;
    }
    let Some((grandparent_id, parent_index)) = doc.position(&parent_id) else {
        return false;
    };
    let moved = doc.relocate(id, &grandparent_id, parent_index + 1);
    if moved {
        tracing::debug!(node = id, parent = %grandparent_id, "outdented node");
    }
    moved
}

/// Swaps `id` with its previous sibling. A first child instead becomes the last
/// child of its parent's previous sibling.
pub fn move_node_up(doc: &mut Document, id: &str) -> bool {
    let Some((parent_id, index)) = doc.position(id) else {
        return false;
    };
    if index > 0 {
        return swap_children(doc, &parent_id, index - 1, index);
    }

    let Some(target) = parent_sibling(doc, &parent_id, Direction::Previous) else {
        return false;
    };
    let end = doc.children(&target).len();
    let moved = doc.relocate(id, &target, end);
    if moved {
        tracing::debug!(node = id, parent = %target, "moved node up across parents");
    }
    moved
}

/// Swaps `id` with its next sibling. A last child instead becomes the first
/// child of its parent's next sibling.
pub fn move_node_down(doc: &mut Document, id: &str) -> bool {
    let Some((parent_id, index)) = doc.position(id) else {
        return false;
    };
    if index + 1 < doc.children(&parent_id).len() {
        return swap_children(doc, &parent_id, index, index + 1);
    }

    let Some(target) = parent_sibling(doc, &parent_id, Direction::Next) else {
        return false;
    };
    let moved = doc.relocate(id, &target, 0);
    if moved {
        tracing::debug!(node = id, parent = %target, "moved node down across parents");
    }
    moved
}

#[derive(Clone, Copy)]
enum Direction {
    Previous,
    Next,
}

/// The sibling of `parent_id` in the given direction, if the parent is not the root.
fn parent_sibling(doc: &Document, parent_id: &str, direction: Direction) -> Option<String> {
    if doc.is_root(parent_id) {
        return None;
    }
    let (grandparent_id, parent_index) = doc.position(parent_id)?;
    let siblings = doc.children(&grandparent_id);
    let index = match direction {
        Direction::Previous => parent_index.checked_sub(1)?,
        Direction::Next => parent_index + 1,
    };
    siblings.get(index).cloned()
}

// Same parent, so ancestor paths are unaffected.
fn swap_children(doc: &mut Document, parent_id: &str, a: usize, b: usize) -> bool {
    let Some(parent) = doc.get_mut(parent_id) else {
        return false;
    };
    parent.children.swap(a, b);
    tracing::debug!(parent = parent_id, from = a, to = b, "swapped siblings");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{assert_consistent, kids, sample};
    use crate::model::Node;

    #[test]
    fn test_indent_appends_to_previous_sibling() {
        let mut doc = sample();
        assert!(indent_node(&mut doc, "b"));
        assert_eq!(kids(&doc, "a"), vec!["a1", "a2", "b"]);
        assert_eq!(kids(&doc, "root"), vec!["a", "c"]);
        assert_eq!(doc.ancestors("b"), &["root".to_string(), "a".to_string()]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_indent_moves_whole_subtree() {
        let mut doc = sample();
        assert!(indent_node(&mut doc, "c"));
        assert_eq!(kids(&doc, "b"), vec!["c"]);
        assert_eq!(
            doc.ancestors("c1"),
            &["root".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_consistent(&doc);
    }

    #[test]
    fn test_indent_first_child_is_noop() {
        let mut doc = sample();
        let before = doc.clone();
        assert!(!indent_node(&mut doc, "a"));
        assert!(!indent_node(&mut doc, "a1"));
        assert!(!indent_node(&mut doc, "root"));
        assert!(!indent_node(&mut doc, "missing"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_outdent_places_after_parent() {
        let mut doc = sample();
        assert!(outdent_node(&mut doc, "a1"));
        assert_eq!(kids(&doc, "root"), vec!["a", "a1", "b", "c"]);
        assert_eq!(kids(&doc, "a"), vec!["a2"]);
        assert_eq!(doc.ancestors("a1"), &["root".to_string()]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_outdent_child_of_root_is_noop() {
        let mut doc = sample();
        let before = doc.clone();
        assert!(!outdent_node(&mut doc, "b"));
        assert!(!outdent_node(&mut doc, "root"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_indent_then_outdent_restores_position() {
        let mut doc = Document::from_nodes(
            [
                Node::with_id("root", "").with_children(["A", "B"]),
                Node::with_id("A", "").with_children(["A1"]),
                Node::with_id("A1", ""),
                Node::with_id("B", ""),
            ],
            "root",
        )
        .unwrap();

        assert!(indent_node(&mut doc, "B"));
        assert_eq!(kids(&doc, "A"), vec!["A1", "B"]);
        assert_eq!(kids(&doc, "root"), vec!["A"]);
        assert_eq!(doc.ancestors("B"), &["root".to_string(), "A".to_string()]);

        assert!(outdent_node(&mut doc, "B"));
        assert_eq!(kids(&doc, "root"), vec!["A", "B"]);
        assert_eq!(doc.ancestors("B"), &["root".to_string()]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_move_up_swaps_siblings() {
        let mut doc = sample();
        assert!(move_node_up(&mut doc, "c"));
        assert_eq!(kids(&doc, "root"), vec!["a", "c", "b"]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_move_down_swaps_siblings() {
        let mut doc = sample();
        assert!(move_node_down(&mut doc, "a1"));
        assert_eq!(kids(&doc, "a"), vec!["a2", "a1"]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_move_up_first_child_joins_previous_parent_sibling() {
        let mut doc = sample();
        assert!(move_node_up(&mut doc, "c1"));
        assert_eq!(kids(&doc, "b"), vec!["c1"]);
        assert!(kids(&doc, "c").is_empty());
        assert_eq!(doc.ancestors("c1"), &["root".to_string(), "b".to_string()]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_move_down_last_child_joins_next_parent_sibling() {
        let mut doc = sample();
        assert!(move_node_down(&mut doc, "a2"));
        assert_eq!(kids(&doc, "a"), vec!["a1"]);
        assert_eq!(kids(&doc, "b"), vec!["a2"]);

        // Lands as the first child when the target already has children
        assert!(move_node_down(&mut doc, "a2"));
        assert_eq!(kids(&doc, "c"), vec!["a2", "c1"]);
        assert_consistent(&doc);
    }

    #[test]
    fn test_move_at_tree_boundary_is_noop() {
        let mut doc = sample();
        let before = doc.clone();
        assert!(!move_node_up(&mut doc, "a"));
        assert!(!move_node_down(&mut doc, "c"));
        // a1 is the first child of the first top-level node
        assert!(!move_node_up(&mut doc, "a1"));
        // c1 is the last child of the last top-level node
        assert!(!move_node_down(&mut doc, "c1"));
        assert!(!move_node_up(&mut doc, "root"));
        assert!(!move_node_down(&mut doc, "nope"));
        assert_eq!(doc, before);
    }
}
