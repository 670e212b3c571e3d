//! Creating nodes: empty siblings and splitting one node in two.

use crate::document::Document;
use crate::model::{Node, NodeId};

/// Inserts a new empty node directly before `id`. Returns the new id.
pub fn create_node_before(doc: &mut Document, id: &str) -> Option<NodeId> {
    let (parent_id, index) = doc.position(id)?;
    let new_id = doc.insert_child(Node::new(""), &parent_id, index)?;
    tracing::debug!(node = %new_id, before = id, "created node");
    Some(new_id)
}

/// Inserts a new empty node directly after `id`. Returns the new id.
pub fn create_sibling_node(doc: &mut Document, id: &str) -> Option<NodeId> {
    let (parent_id, index) = doc.position(id)?;
    let new_id = doc.insert_child(Node::new(""), &parent_id, index + 1)?;
    tracing::debug!(node = %new_id, after = id, "created node");
    Some(new_id)
}

/// Splits `full_content` at character `offset`: `id` keeps the prefix and a
/// new node receives the suffix.
///
/// The new node becomes the first child of `id` when `create_as_child` is set
/// and `id` already has children; otherwise it becomes the next sibling. The
/// root has no siblings, so splitting it always yields a first child.
pub fn split_node(
    doc: &mut Document,
    id: &str,
    full_content: &str,
    offset: usize,
    create_as_child: bool,
) -> Option<NodeId> {
    let (as_child, parent_id, index) = if doc.is_root(id) {
        (true, id.to_string(), 0)
    } else {
        let has_children = doc.get(id)?.has_children();
        if create_as_child && has_children {
            (true, id.to_string(), 0)
        } else {
            let (parent_id, index) = doc.position(id)?;
            (false, parent_id, index + 1)
        }
    };

    let (prefix, suffix) = split_at_char(full_content, offset);
    doc.get_mut(id)?.content = prefix.to_string();
    let new_id = doc.insert_child(Node::new(suffix), &parent_id, index)?;
    tracing::debug!(node = id, new_node = %new_id, offset, as_child, "split node");
    Some(new_id)
}

fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    let byte = text
        .char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len());
    text.split_at(byte)
}
