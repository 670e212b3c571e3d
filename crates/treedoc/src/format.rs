//! # Persisted Document Format
//!
//! The on-disk shape of a document, as exchanged with a
//! [`DocumentStore`](crate::store::DocumentStore):
//!
//! ```text
//! {
//!   "format": "treedoc",
//!   "version": "1.0",
//!   "created": "2024-01-01T00:00:00Z",
//!   "updated": "2024-01-02T00:00:00Z",
//!   "author": "",
//!   "rootNodeId": "…",
//!   "nodes": { "<id>": { "id": "<id>", "content": "…", "children": [], "metadata": {} } }
//! }
//! ```
//!
//! Loading migrates older files transparently: status glyphs become enum values
//! (see [`NodeStatus`](crate::model::NodeStatus)) and a root without `isRoot`
//! gets the marker injected.

use crate::document::Document;
use crate::error::{Result, TreeDocError};
use crate::model::{Node, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const FORMAT_NAME: &str = "treedoc";
pub const FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub format: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    pub root_node_id: NodeId,
    pub nodes: HashMap<NodeId, Node>,
}

impl DocumentFile {
    /// Snapshots a live document. `created` is kept from a previous save when known.
    pub fn from_document(doc: &Document, author: &str, created: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION.to_string(),
            created: created.unwrap_or(now),
            updated: now,
            author: author.to_string(),
            root_node_id: doc.root_id().to_string(),
            nodes: doc.nodes().clone(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(json)?;
        if file.format != FORMAT_NAME {
            return Err(TreeDocError::InvalidDocument(format!(
                "unexpected format '{}'",
                file.format
            )));
        }
        Ok(file)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the live document, injecting the root marker if it was missing.
    pub fn into_document(self) -> Result<Document> {
        let missing_marker = self
            .nodes
            .get(&self.root_node_id)
            .is_some_and(|root| !root.metadata.is_root);
        if missing_marker {
            tracing::debug!(root = %self.root_node_id, "injecting missing isRoot marker");
        }
        Document::new(self.nodes, self.root_node_id)
    }
}
