//! Undoable blueprint and context-declaration edits.
//!
//! Painting touches an unpredictable set of nodes (every ancestor, a whole
//! subtree minus nested declarations, every node that referenced a removed
//! context). The command therefore diffs metadata before and after the edit
//! and keeps both versions for exactly the nodes that changed.

use super::Command;
use crate::actions::context;
use crate::document::Document;
use crate::error::Result;
use crate::model::{NodeId, NodeMetadata};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlueprintOp {
    Add,
    Remove { cascade: bool },
    DeclareContext { icon: Option<String>, color: Option<String> },
    RemoveContext,
}

#[derive(Debug, Clone)]
pub struct BlueprintCommand {
    node_id: NodeId,
    op: BlueprintOp,
    before: HashMap<NodeId, NodeMetadata>,
    after: HashMap<NodeId, NodeMetadata>,
}

impl BlueprintCommand {
    pub fn new(node_id: impl Into<NodeId>, op: BlueprintOp) -> Self {
        Self {
            node_id: node_id.into(),
            op,
            before: HashMap::new(),
            after: HashMap::new(),
        }
    }

    pub fn add(node_id: impl Into<NodeId>) -> Self {
        Self::new(node_id, BlueprintOp::Add)
    }

    pub fn remove(node_id: impl Into<NodeId>, cascade: bool) -> Self {
        Self::new(node_id, BlueprintOp::Remove { cascade })
    }

    pub fn declare_context(node_id: impl Into<NodeId>, icon: Option<&str>, color: Option<&str>) -> Self {
        Self::new(
            node_id,
            BlueprintOp::DeclareContext {
                icon: icon.map(str::to_string),
                color: color.map(str::to_string),
            },
        )
    }

    pub fn remove_context(node_id: impl Into<NodeId>) -> Self {
        Self::new(node_id, BlueprintOp::RemoveContext)
    }

    /// Number of nodes whose metadata the last execution changed.
    pub fn affected(&self) -> usize {
        self.before.len()
    }

    fn apply(&self, doc: &mut Document) -> Result<bool> {
        let id = self.node_id.as_str();
        match &self.op {
            BlueprintOp::Add => Ok(context::add_to_blueprint(doc, id)),
            BlueprintOp::Remove { cascade } => Ok(context::remove_from_blueprint(doc, id, *cascade)),
            BlueprintOp::DeclareContext { icon, color } => {
                context::declare_as_context(doc, id, icon.as_deref(), color.as_deref())
            }
            BlueprintOp::RemoveContext => Ok(context::remove_context_declaration(doc, id)),
        }
    }
}

fn restore(doc: &mut Document, snapshot: &HashMap<NodeId, NodeMetadata>) {
    for (id, metadata) in snapshot {
        if let Some(node) = doc.get_mut(id) {
            node.metadata = metadata.clone();
        }
    }
}

impl Command for BlueprintCommand {
    fn label(&self) -> String {
        match self.op {
            BlueprintOp::Add => "Add to blueprint",
            BlueprintOp::Remove { .. } => "Remove from blueprint",
            BlueprintOp::DeclareContext { .. } => "Declare context",
            BlueprintOp::RemoveContext => "Remove context",
        }
        .to_string()
    }

    fn execute(&mut self, doc: &mut Document) -> Result<bool> {
        let snapshot: HashMap<NodeId, NodeMetadata> = doc
            .nodes()
            .iter()
            .map(|(id, node)| (id.clone(), node.metadata.clone()))
            .collect();

        if !self.apply(doc)? {
            return Ok(false);
        }

        self.before.clear();
        self.after.clear();
        for (id, old) in snapshot {
            let Some(node) = doc.get(&id) else {
                continue;
            };
            if node.metadata != old {
                self.after.insert(id.clone(), node.metadata.clone());
                self.before.insert(id, old);
            }
        }
        Ok(!self.before.is_empty())
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        restore(doc, &self.before);
        Ok(())
    }

    fn redo(&mut self, doc: &mut Document) -> Result<()> {
        restore(doc, &self.after);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{applied, testing::sample};
    use crate::error::TreeDocError;
    use crate::history::CommandHistory;

    #[test]
    fn test_add_undo_restores_ancestors() {
        let mut doc = sample();
        let before = doc.clone();
        let mut history = CommandHistory::new();

        assert!(history
            .execute_command(&mut doc, Box::new(BlueprintCommand::add("a1")))
            .unwrap());
        assert!(doc.get("root").unwrap().metadata.is_blueprint);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc, before);

        history.redo(&mut doc).unwrap();
        assert!(doc.get("a").unwrap().metadata.is_blueprint);
        assert!(doc.get("a1").unwrap().metadata.is_blueprint);
    }

    #[test]
    fn test_only_changed_nodes_are_captured() {
        let mut doc = sample();
        let mut command = BlueprintCommand::add("a1");
        assert!(command.execute(&mut doc).unwrap());
        assert_eq!(command.affected(), 3);
    }

    #[test]
    fn test_remove_context_undo_restores_applied_references() {
        let mut doc = sample();
        context::add_to_blueprint(&mut doc, "a");
        context::declare_as_context(&mut doc, "a1", Some("*"), None).unwrap();
        applied::apply_context(&mut doc, "b", "a1");
        let before = doc.clone();

        let mut history = CommandHistory::new();
        history
            .execute_command(&mut doc, Box::new(BlueprintCommand::remove_context("a1")))
            .unwrap();
        assert!(doc.get("b").unwrap().metadata.applied_context_ids.is_empty());

        history.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
        assert_eq!(doc.get("b").unwrap().metadata.active_context_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_rejected_declaration_is_not_recorded() {
        let mut doc = sample();
        let mut history = CommandHistory::new();
        let result = history.execute_command(&mut doc, Box::new(BlueprintCommand::declare_context("b", None, None)));
        assert!(matches!(result, Err(TreeDocError::ParentNotBlueprint(_))));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut doc = sample();
        let mut history = CommandHistory::new();
        assert!(!history
            .execute_command(&mut doc, Box::new(BlueprintCommand::remove("b", true)))
            .unwrap());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_cascade_remove_round_trip() {
        let mut doc = sample();
        context::add_to_blueprint(&mut doc, "a1");
        context::add_to_blueprint(&mut doc, "a2");
        let before = doc.clone();

        let mut history = CommandHistory::new();
        history
            .execute_command(&mut doc, Box::new(BlueprintCommand::remove("a", true)))
            .unwrap();
        let after = doc.clone();
        assert!(!doc.get("a2").unwrap().metadata.is_blueprint);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
        history.redo(&mut doc).unwrap();
        assert_eq!(doc, after);
    }
}
