//! # Domain Model: Nodes and Their Metadata
//!
//! A document is a tree of [`Node`]s. Each node carries its text content, the
//! ordered ids of its children and an open metadata map ([`NodeMetadata`]).
//!
//! ## Metadata Keys
//!
//! Metadata is persisted as a flat JSON object. The keys the engine itself
//! understands are typed fields; anything else a client stores is kept in
//! [`NodeMetadata::extra`] and written back untouched.
//!
//! | Key | Type | Meaning |
//! |-----|------|---------|
//! | `isRoot` | bool | Marks the document root |
//! | `status` | [`NodeStatus`] | Task state of the node |
//! | `collapsed` | bool | Children hidden in the outline view |
//! | `isBlueprint` | bool | Node is part of reusable template structure |
//! | `isContextDeclaration` | bool | Node declares a reusable context |
//! | `blueprintIcon` / `blueprintColor` | string | Presentation of a declaration |
//! | `appliedContextIds` | list | Contexts referenced by this node, in order |
//! | `activeContextId` | string | The applied context currently in effect |
//!
//! ## Legacy Status Glyphs
//!
//! Early documents stored status as glyphs. They are migrated on load:
//! `☐` → `pending`, `✓` → `completed`, `✗` → `abandoned`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type NodeId = String;

/// Generates a fresh, globally unique node id.
pub fn new_node_id() -> NodeId {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Completed,
    Abandoned,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Completed => "completed",
            NodeStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" | "☐" => Ok(NodeStatus::Pending),
            "completed" | "✓" => Ok(NodeStatus::Completed),
            "abandoned" | "✗" => Ok(NodeStatus::Abandoned),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

// Accepts both the enum names and the legacy glyphs.
impl<'de> Deserialize<'de> for NodeStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_blueprint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_context_declaration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_context_ids: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_context_id: Option<NodeId>,
    /// Client-owned keys the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    /// Creates a childless node with a freshly generated id.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(new_node_id(), content)
    }

    pub fn with_id(id: impl Into<NodeId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            children: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn child_index(&self, child_id: &str) -> Option<usize> {
        self.children.iter().position(|c| c == child_id)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
