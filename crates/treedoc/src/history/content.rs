//! Undoable text edit of a single node.

use super::Command;
use crate::actions::content::update_content;
use crate::document::Document;
use crate::error::{Result, TreeDocError};
use crate::model::NodeId;

#[derive(Debug, Clone)]
pub struct EditContentCommand {
    node_id: NodeId,
    content: String,
    previous: Option<String>,
}

impl EditContentCommand {
    pub fn new(node_id: impl Into<NodeId>, content: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            content: content.into(),
            previous: None,
        }
    }
}

impl Command for EditContentCommand {
    fn label(&self) -> String {
        "Edit text".to_string()
    }

    fn execute(&mut self, doc: &mut Document) -> Result<bool> {
        let current = doc
            .get(&self.node_id)
            .map(|node| node.content.clone())
            .ok_or_else(|| TreeDocError::NodeNotFound(self.node_id.clone()))?;
        if !update_content(doc, &self.node_id, &self.content) {
            return Ok(false);
        }
        self.previous = Some(current);
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        let previous = self.previous.as_deref().unwrap_or_default();
        if !doc.contains(&self.node_id) {
            return Err(TreeDocError::NodeNotFound(self.node_id.clone()));
        }
        update_content(doc, &self.node_id, previous);
        Ok(())
    }
}
