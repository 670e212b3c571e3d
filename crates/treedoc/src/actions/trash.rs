//! # Soft Delete and the Delete Buffer
//!
//! Deleting a node does not destroy it. The node and its subtree move into a
//! tombstone map, and one entry is pushed onto a bounded FIFO queue. Each entry
//! is an independently restorable *delete group*, identified by a
//! `delete_buffer_id` shared by every tombstone created in that deletion.
//!
//! ## Deletion Lifecycle
//!
//! - **Delete**: the subtree leaves the [`Document`] and becomes tombstones.
//! - **Undelete**: the newest group is spliced back where it came from.
//! - **Evict**: once the queue exceeds its capacity the oldest group's
//!   tombstones are erased for good.
//! - **Purge**: everything is erased (e.g. when the document is closed).
//!
//! ## Buffer Ids Are Assigned Once
//!
//! A tombstone keeps the buffer id it received when its own node was first
//! deleted. Recording uses an explicit *tombstone-if-absent* step, never an
//! overwrite, so each fragment of an overlapping deletion restores on its own
//! schedule.
//!
//! ## Two-Phase Confirmation
//!
//! Deleting a node that has children requires `confirmed = true`. Without it
//! the call returns [`DeleteOutcome::NeedsConfirmation`] and changes nothing;
//! the UI asks the user and calls again.

use crate::document::Document;
use crate::model::{new_node_id, Node, NodeId};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CAPACITY: usize = 10;

/// A soft-deleted node and where it used to live.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedNodeInfo {
    pub node: Node,
    pub original_parent_id: NodeId,
    pub original_position: usize,
    pub delete_buffer_id: String,
    pub deleted_at: DateTime<Utc>,
}

/// One restorable delete group in the FIFO queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedNodeEntry {
    pub root_node_id: NodeId,
    pub delete_buffer_id: String,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Unknown id or the root: nothing happened.
    Ignored,
    /// The node has children and the call was not confirmed.
    NeedsConfirmation,
    /// The node was the last child of the root; its content was cleared instead.
    Cleared { node_id: NodeId },
    /// The subtree was moved to the delete buffer.
    Deleted {
        node_id: NodeId,
        /// Where the selection should go next, if anywhere.
        focus: Option<NodeId>,
    },
}

impl DeleteOutcome {
    /// `true` when the delete took effect, either structurally or by clearing.
    pub fn is_done(&self) -> bool {
        matches!(self, DeleteOutcome::Cleared { .. } | DeleteOutcome::Deleted { .. })
    }

    pub fn focus(&self) -> Option<&str> {
        match self {
            DeleteOutcome::Deleted { focus, .. } => focus.as_deref(),
            DeleteOutcome::Cleared { node_id } => Some(node_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeletionBuffer {
    tombstones: HashMap<NodeId, DeletedNodeInfo>,
    queue: VecDeque<DeletedNodeEntry>,
    capacity: usize,
}

impl Default for DeletionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeletionBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tombstones: HashMap::new(),
            queue: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of restorable groups.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DeletedNodeEntry> {
        self.queue.iter()
    }

    pub fn tombstone(&self, id: &str) -> Option<&DeletedNodeInfo> {
        self.tombstones.get(id)
    }

    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }

    /// Soft-deletes `id` and its subtree.
    pub fn delete_node(&mut self, doc: &mut Document, id: &str, confirmed: bool) -> DeleteOutcome {
        let Some((parent_id, index)) = doc.position(id) else {
            return DeleteOutcome::Ignored;
        };
        let has_children = doc.get(id).is_some_and(Node::has_children);
        if has_children && !confirmed {
            return DeleteOutcome::NeedsConfirmation;
        }

        // The document always keeps at least one visible node.
        if doc.is_root(&parent_id) && doc.children(&parent_id).len() == 1 {
            if let Some(node) = doc.get_mut(id) {
                node.content.clear();
            }
            tracing::debug!(node = id, "cleared last remaining node instead of deleting");
            return DeleteOutcome::Cleared {
                node_id: id.to_string(),
            };
        }

        let focus = focus_after_delete(doc, &parent_id, index);
        let delete_buffer_id = new_node_id();
        let deleted_at = Utc::now();

        doc.unlink(id);
        let subtree = doc.take_subtree(id);

        let mut origins: HashMap<NodeId, (NodeId, usize)> = HashMap::new();
        origins.insert(id.to_string(), (parent_id, index));
        for node in &subtree {
            for (position, child) in node.children.iter().enumerate() {
                origins.insert(child.clone(), (node.id.clone(), position));
            }
        }

        let count = subtree.len();
        for node in subtree {
            let Some((original_parent_id, original_position)) = origins.remove(&node.id) else {
                continue;
            };
            self.tombstones
                .entry(node.id.clone())
                .or_insert_with(|| DeletedNodeInfo {
                    node,
                    original_parent_id,
                    original_position,
                    delete_buffer_id: delete_buffer_id.clone(),
                    deleted_at,
                });
        }

        self.queue.push_back(DeletedNodeEntry {
            root_node_id: id.to_string(),
            delete_buffer_id,
            deleted_at,
        });
        self.evict_overflow();

        tracing::debug!(node = id, nodes = count, groups = self.queue.len(), "deleted node");
        DeleteOutcome::Deleted {
            node_id: id.to_string(),
            focus,
        }
    }

    /// Restores the most recent delete group. Returns `false` if there is none.
    pub fn undelete_node(&mut self, doc: &mut Document) -> bool {
        let Some(entry) = self.queue.pop_back() else {
            return false;
        };
        let group = &entry.delete_buffer_id;
        if doc.contains(&entry.root_node_id) {
            tracing::warn!(node = %entry.root_node_id, "deleted node is live again, dropping its delete group");
            self.forget_group(group);
            return false;
        }
        let Some(root_info) = self.take_tombstone(&entry.root_node_id, group) else {
            tracing::warn!(node = %entry.root_node_id, "delete group has no root tombstone");
            self.forget_group(group);
            return false;
        };

        let mut parent_id = root_info.original_parent_id.clone();
        let mut position = root_info.original_position;
        if !doc.contains(&parent_id) {
            tracing::warn!(
                node = %entry.root_node_id,
                parent = %parent_id,
                "original parent is gone, restoring under the root"
            );
            parent_id = doc.root_id().to_string();
            position = usize::MAX;
        }

        let mut restored = 0;
        let mut stack = vec![root_info.node];
        while let Some(mut node) = stack.pop() {
            let mut kept = Vec::with_capacity(node.children.len());
            for child in std::mem::take(&mut node.children) {
                // A live id was brought back by some other edit; restoring it would duplicate it.
                if doc.contains(&child) {
                    tracing::warn!(node = %child, "deleted node is live again, not restoring it");
                    continue;
                }
                if let Some(info) = self.take_tombstone(&child, group) {
                    stack.push(info.node);
                    kept.push(child);
                }
            }
            node.children = kept;
            doc.nodes.insert(node.id.clone(), node);
            restored += 1;
        }

        doc.link(&entry.root_node_id, &parent_id, position);
        self.forget_group(group);
        tracing::debug!(node = %entry.root_node_id, nodes = restored, "undeleted node");
        true
    }

    /// Erases every tombstone and forgets every group.
    pub fn purge_old_deleted_nodes(&mut self) {
        let count = self.tombstones.len();
        self.tombstones.clear();
        self.queue.clear();
        tracing::info!(tombstones = count, "purged delete buffer");
    }

    /// Drops tombstones whose ids are live in `doc` again, together with any
    /// group that thereby lost its root. Returns how many tombstones went.
    pub fn discard_revived(&mut self, doc: &Document) -> usize {
        let before = self.tombstones.len();
        self.tombstones.retain(|id, _| !doc.contains(id));
        if self.tombstones.len() == before {
            return 0;
        }

        let tombstones = &self.tombstones;
        let mut broken = Vec::new();
        self.queue.retain(|entry| {
            let intact = tombstones
                .get(&entry.root_node_id)
                .is_some_and(|info| info.delete_buffer_id == entry.delete_buffer_id);
            if !intact {
                broken.push(entry.delete_buffer_id.clone());
            }
            intact
        });
        for group in &broken {
            self.forget_group(group);
        }

        let dropped = before - self.tombstones.len();
        tracing::warn!(dropped, groups = broken.len(), "dropped tombstones of nodes that are live again");
        dropped
    }

    /// Changes the capacity, evicting the oldest groups if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    fn take_tombstone(&mut self, id: &str, group: &str) -> Option<DeletedNodeInfo> {
        if self.tombstones.get(id)?.delete_buffer_id != group {
            return None;
        }
        self.tombstones.remove(id)
    }

    /// Drops whatever is left of a group that can no longer be restored.
    fn forget_group(&mut self, group: &str) {
        self.tombstones.retain(|_, info| info.delete_buffer_id != group);
    }

    fn evict_overflow(&mut self) {
        while self.queue.len() > self.capacity {
            let Some(evicted) = self.queue.pop_front() else {
                break;
            };
            let before = self.tombstones.len();
            self.forget_group(&evicted.delete_buffer_id);
            tracing::info!(
                node = %evicted.root_node_id,
                tombstones = before - self.tombstones.len(),
                "evicted oldest delete group"
            );
        }
    }
}

/// The previous sibling's deepest visible last descendant, else the parent
/// unless it is the root.
fn focus_after_delete(doc: &Document, parent_id: &str, index: usize) -> Option<NodeId> {
    if index == 0 {
        return (!doc.is_root(parent_id)).then(|| parent_id.to_string());
    }
    let mut current = doc.children(parent_id).get(index - 1)?.clone();
    loop {
        let node = doc.get(&current)?;
        match node.children.last() {
            Some(last) if !node.metadata.collapsed => current = last.clone(),
            _ => return Some(current),
        }
    }
}
