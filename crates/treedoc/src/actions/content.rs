//! Per-node edits that leave the tree shape alone.

use crate::document::Document;
use crate::model::NodeStatus;

pub fn update_content(doc: &mut Document, id: &str, content: &str) -> bool {
    let Some(node) = doc.get_mut(id) else {
        return false;
    };
    if node.content == content {
        return false;
    }
    node.content = content.to_string();
    true
}

/// Sets or clears (`None`) the status of a node.
pub fn set_status(doc: &mut Document, id: &str, status: Option<NodeStatus>) -> bool {
    let Some(node) = doc.get_mut(id) else {
        return false;
    };
    if node.metadata.status == status {
        return false;
    }
    node.metadata.status = status;
    true
}

/// Flips the collapsed flag. Collapsing a leaf is allowed but has no visible effect.
pub fn toggle_collapsed(doc: &mut Document, id: &str) -> bool {
    let Some(node) = doc.get_mut(id) else {
        return false;
    };
    node.metadata.collapsed = !node.metadata.collapsed;
    true
}
