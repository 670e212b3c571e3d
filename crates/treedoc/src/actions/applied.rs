//! Contexts applied to arbitrary nodes.
//!
//! Any node can reference declared contexts through its `appliedContextIds`
//! list (ordered, no duplicates). One of them is the node's
//! `activeContextId`. The active entry is kept valid automatically: the first
//! entry is selected when the list stops being empty, and the entry after the
//! removed one (or the new last entry) takes over when the active one goes away.

use crate::actions::context::is_declaration;
use crate::document::Document;
use crate::model::{NodeId, NodeMetadata};

/// Appends `context_id` to `target_id`'s applied contexts.
///
/// No-op unless `context_id` is a live declaration not already applied.
pub fn apply_context(doc: &mut Document, target_id: &str, context_id: &str) -> bool {
    if !is_declaration(doc, context_id) {
        return false;
    }
    let Some(node) = doc.get_mut(target_id) else {
        return false;
    };
    let meta = &mut node.metadata;
    if meta.applied_context_ids.iter().any(|c| c == context_id) {
        return false;
    }
    meta.applied_context_ids.push(context_id.to_string());
    if meta.active_context_id.is_none() {
        meta.active_context_id = meta.applied_context_ids.first().cloned();
    }
    tracing::debug!(node = target_id, context = context_id, "applied context");
    true
}

/// Removes `context_id` from `target_id`, or every applied context when `None`.
pub fn remove_applied_context(doc: &mut Document, target_id: &str, context_id: Option<&str>) -> bool {
    let Some(node) = doc.get_mut(target_id) else {
        return false;
    };
    let meta = &mut node.metadata;
    let changed = match context_id {
        Some(context_id) => drop_entry(meta, context_id),
        None => {
            let had_any = !meta.applied_context_ids.is_empty() || meta.active_context_id.is_some();
            meta.applied_context_ids.clear();
            meta.active_context_id = None;
            had_any
        }
    };
    if changed {
        tracing::debug!(node = target_id, context = ?context_id, "removed applied context");
    }
    changed
}

/// Selects an already applied context as the active one.
pub fn set_active_context(doc: &mut Document, target_id: &str, context_id: &str) -> bool {
    let Some(node) = doc.get_mut(target_id) else {
        return false;
    };
    let meta = &mut node.metadata;
    if meta.active_context_id.as_deref() == Some(context_id)
        || !meta.applied_context_ids.iter().any(|c| c == context_id)
    {
        return false;
    }
    meta.active_context_id = Some(context_id.to_string());
    true
}

/// The context in effect at `id`: its own active context, else the nearest
/// ancestor's.
pub fn resolve_active_context(doc: &Document, id: &str) -> Option<NodeId> {
    doc.get(id)?;
    std::iter::once(id)
        .chain(doc.ancestors(id).iter().rev().map(String::as_str))
        .filter_map(|node_id| doc.get(node_id))
        .find_map(|node| node.metadata.active_context_id.clone())
}

/// Strips `context_id` from every node's applied list. Returns how many nodes
/// referenced it.
pub(crate) fn detach_context(doc: &mut Document, context_id: &str) -> usize {
    doc.nodes
        .values_mut()
        .map(|node| drop_entry(&mut node.metadata, context_id))
        .filter(|dropped| *dropped)
        .count()
}

fn drop_entry(meta: &mut NodeMetadata, context_id: &str) -> bool {
    let Some(index) = meta.applied_context_ids.iter().position(|c| c == context_id) else {
        return false;
    };
    meta.applied_context_ids.remove(index);
    if meta.active_context_id.as_deref() == Some(context_id) {
        let next = index.min(meta.applied_context_ids.len().saturating_sub(1));
        meta.active_context_id = meta.applied_context_ids.get(next).cloned();
    }
    true
}
