//! # API Facade
//!
//! [`TreeDocApi`] is the single entry point for editing a document. It owns
//! the [`Document`], the [`DeletionBuffer`] and the [`CommandHistory`], and
//! dispatches every call to the matching action module.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to `actions/*` (directly, or wrapped in a history command)
//! - **Fires autosave** after every call that changed the document
//! - **Audits** the ancestor registry after changes when configured to
//!
//! It does not contain tree logic; that belongs in the action modules.
//!
//! ## Which Calls Are Undoable
//!
//! | Kind | Undo path |
//! |------|-----------|
//! | Delete | [`undelete_node`](TreeDocApi::undelete_node), newest group first |
//! | Blueprint / context declaration | [`undo`](TreeDocApi::undo) |
//! | Subtree replacement, [`edit_content`](TreeDocApi::edit_content) | [`undo`](TreeDocApi::undo) |
//! | Structure, applied contexts, status, collapse | Not recorded; apply the opposite action |
//!
//! ## Generic Over AutosaveTrigger
//!
//! `TreeDocApi<A: AutosaveTrigger>` takes the autosave hook as a type
//! parameter:
//! - Embedding in an event loop: `TreeDocApi<DebouncedAutosave>` plus
//!   [`poll_autosave`](TreeDocApi::poll_autosave)
//! - Custom hosts: any `FnMut()` closure
//! - Tests: [`NoopAutosave`]

use crate::actions::context::ContextDeclarationInfo;
use crate::actions::paste::Fragment;
use crate::actions::trash::{DeleteOutcome, DeletionBuffer};
use crate::actions::{applied, content, context, create, paste, structure};
use crate::autosave::{AutosaveTrigger, DebouncedAutosave, NoopAutosave};
use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::Result;
use crate::format::DocumentFile;
use crate::history::{BlueprintCommand, Command, CommandHistory, EditContentCommand, ReplaceSubtreeCommand};
use crate::model::{Node, NodeId, NodeStatus};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Instant;

pub struct TreeDocApi<A: AutosaveTrigger = NoopAutosave> {
    doc: Document,
    trash: DeletionBuffer,
    history: CommandHistory,
    config: EngineConfig,
    autosave: A,
    created: Option<DateTime<Utc>>,
}

impl<A: AutosaveTrigger> TreeDocApi<A> {
    pub fn new(doc: Document, config: EngineConfig, autosave: A) -> Self {
        Self {
            doc,
            trash: DeletionBuffer::with_capacity(config.delete_buffer_capacity),
            history: CommandHistory::with_limit(config.history_limit),
            config,
            autosave,
            created: None,
        }
    }

    /// A fresh document with a single empty node.
    pub fn blank(config: EngineConfig, autosave: A) -> Self {
        Self::new(Document::blank(), config, autosave)
    }

    /// Opens the document held by `store`, or a blank one if it is empty.
    pub fn load<S: DocumentStore>(store: &S, config: EngineConfig, autosave: A) -> Result<Self> {
        match store.load()? {
            Some(file) => {
                let created = file.created;
                let doc = file.into_document()?;
                tracing::info!(location = %store.location().display(), nodes = doc.len(), "loaded document");
                let mut api = Self::new(doc, config, autosave);
                api.created = Some(created);
                Ok(api)
            }
            None => {
                tracing::info!(location = %store.location().display(), "no stored document, starting blank");
                Ok(Self::blank(config, autosave))
            }
        }
    }

    /// Replaces the document wholesale. Delete groups and undo history from
    /// the previous document are dropped.
    pub fn initialize(&mut self, nodes: HashMap<NodeId, Node>, root_id: impl Into<NodeId>) -> Result<()> {
        self.doc = Document::new(nodes, root_id)?;
        self.trash.purge_old_deleted_nodes();
        self.history.clear();
        self.created = None;
        self.audit();
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn deletion_buffer(&self) -> &DeletionBuffer {
        &self.trash
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn autosave(&self) -> &A {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut A {
        &mut self.autosave
    }

    /// The document in its persisted shape.
    pub fn snapshot(&self) -> DocumentFile {
        DocumentFile::from_document(&self.doc, &self.config.author, self.created)
    }

    pub fn save<S: DocumentStore>(&mut self, store: &S) -> Result<()> {
        let file = self.snapshot();
        store.save(&file)?;
        self.created.get_or_insert(file.created);
        Ok(())
    }

    // --- Structure ---

    pub fn indent_node(&mut self, id: &str) -> bool {
        let changed = structure::indent_node(&mut self.doc, id);
        self.after(changed)
    }

    pub fn outdent_node(&mut self, id: &str) -> bool {
        let changed = structure::outdent_node(&mut self.doc, id);
        self.after(changed)
    }

    pub fn move_node_up(&mut self, id: &str) -> bool {
        let changed = structure::move_node_up(&mut self.doc, id);
        self.after(changed)
    }

    pub fn move_node_down(&mut self, id: &str) -> bool {
        let changed = structure::move_node_down(&mut self.doc, id);
        self.after(changed)
    }

    pub fn create_node_before(&mut self, id: &str) -> Option<NodeId> {
        let created = create::create_node_before(&mut self.doc, id);
        self.after(created.is_some());
        created
    }

    pub fn create_sibling_node(&mut self, id: &str) -> Option<NodeId> {
        let created = create::create_sibling_node(&mut self.doc, id);
        self.after(created.is_some());
        created
    }

    pub fn split_node(&mut self, id: &str, full_content: &str, offset: usize, create_as_child: bool) -> Option<NodeId> {
        let created = create::split_node(&mut self.doc, id, full_content, offset, create_as_child);
        self.after(created.is_some());
        created
    }

    pub fn copy_nodes(&self, ids: &[NodeId]) -> Fragment {
        Fragment::copy(&self.doc, ids)
    }

    pub fn paste_fragment(&mut self, parent_id: &str, index: usize, fragment: &Fragment) -> Vec<NodeId> {
        let pasted = paste::paste_fragment(&mut self.doc, parent_id, index, fragment);
        self.after(!pasted.is_empty());
        pasted
    }

    /// Pastes externally built nodes: `roots` in order, with `nodes` holding
    /// them and everything below them. Nothing is pasted unless `roots` and
    /// their children form a forest; nodes outside it are ignored.
    pub fn paste_subtree(
        &mut self,
        parent_id: &str,
        index: usize,
        roots: Vec<NodeId>,
        nodes: HashMap<NodeId, Node>,
    ) -> Vec<NodeId> {
        let fragment = Fragment { roots, nodes };
        self.paste_fragment(parent_id, index, &fragment)
    }

    // --- Content ---

    pub fn update_content(&mut self, id: &str, text: &str) -> bool {
        let changed = content::update_content(&mut self.doc, id, text);
        self.after(changed)
    }

    /// Like [`update_content`](Self::update_content), but undoable.
    pub fn edit_content(&mut self, id: &str, text: &str) -> Result<bool> {
        self.record(Box::new(EditContentCommand::new(id, text)))
    }

    pub fn set_status(&mut self, id: &str, status: Option<NodeStatus>) -> bool {
        let changed = content::set_status(&mut self.doc, id, status);
        self.after(changed)
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> bool {
        let changed = content::toggle_collapsed(&mut self.doc, id);
        self.after(changed)
    }

    /// Replaces the subtree at `target_id` (undoable).
    pub fn replace_subtree(&mut self, target_id: &str, nodes: HashMap<NodeId, Node>) -> Result<bool> {
        self.record(Box::new(ReplaceSubtreeCommand::new(target_id, nodes)))
    }

    // --- Deletion ---

    pub fn delete_node(&mut self, id: &str, confirmed: bool) -> DeleteOutcome {
        let outcome = self.trash.delete_node(&mut self.doc, id, confirmed);
        self.after(outcome.is_done());
        outcome
    }

    pub fn undelete_node(&mut self) -> bool {
        let restored = self.trash.undelete_node(&mut self.doc);
        self.after(restored)
    }

    pub fn purge_old_deleted_nodes(&mut self) {
        self.trash.purge_old_deleted_nodes();
    }

    /// Resizes the delete buffer. Shrinking it evicts the oldest groups.
    pub fn set_delete_buffer_capacity(&mut self, capacity: usize) {
        self.config.delete_buffer_capacity = capacity;
        self.trash.set_capacity(capacity);
    }

    // --- Blueprints and contexts ---

    pub fn add_to_blueprint(&mut self, id: &str) -> Result<bool> {
        self.record(Box::new(BlueprintCommand::add(id)))
    }

    pub fn remove_from_blueprint(&mut self, id: &str, cascade: bool) -> Result<bool> {
        self.record(Box::new(BlueprintCommand::remove(id, cascade)))
    }

    pub fn declare_as_context(&mut self, id: &str, icon: Option<&str>, color: Option<&str>) -> Result<bool> {
        self.record(Box::new(BlueprintCommand::declare_context(id, icon, color)))
    }

    pub fn remove_context_declaration(&mut self, id: &str) -> Result<bool> {
        self.record(Box::new(BlueprintCommand::remove_context(id)))
    }

    pub fn get_context_declaration_id(&self, id: &str) -> Option<NodeId> {
        context::get_context_declaration_id(&self.doc, id)
    }

    pub fn context_declarations(&self) -> Vec<ContextDeclarationInfo> {
        context::context_declarations(&self.doc)
    }

    pub fn apply_context(&mut self, target_id: &str, context_id: &str) -> bool {
        let changed = applied::apply_context(&mut self.doc, target_id, context_id);
        self.after(changed)
    }

    pub fn remove_applied_context(&mut self, target_id: &str, context_id: Option<&str>) -> bool {
        let changed = applied::remove_applied_context(&mut self.doc, target_id, context_id);
        self.after(changed)
    }

    pub fn set_active_context(&mut self, target_id: &str, context_id: &str) -> bool {
        let changed = applied::set_active_context(&mut self.doc, target_id, context_id);
        self.after(changed)
    }

    pub fn resolve_active_context(&self, id: &str) -> Option<NodeId> {
        applied::resolve_active_context(&self.doc, id)
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.history.undo(&mut self.doc)?;
        Ok(self.after_history(undone))
    }

    pub fn redo(&mut self) -> Result<bool> {
        let redone = self.history.redo(&mut self.doc)?;
        Ok(self.after_history(redone))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn record(&mut self, command: Box<dyn Command>) -> Result<bool> {
        let changed = self.history.execute_command(&mut self.doc, command)?;
        Ok(self.after_history(changed))
    }

    /// Subtree swaps can bring back ids that are sitting in the delete buffer.
    fn after_history(&mut self, changed: bool) -> bool {
        if changed {
            self.trash.discard_revived(&self.doc);
        }
        self.after(changed)
    }

    /// Post-mutation hook. Passes `changed` through.
    fn after(&mut self, changed: bool) -> bool {
        if changed {
            self.audit();
            self.autosave.trigger_autosave();
        }
        changed
    }

    fn audit(&self) {
        if self.config.audit_enabled() {
            // Divergences are logged by the audit itself.
            self.doc.audit_registry();
        }
    }
}

impl TreeDocApi<DebouncedAutosave> {
    /// A facade whose autosave uses the configured debounce delay.
    pub fn debounced(doc: Document, config: EngineConfig) -> Self {
        let autosave = DebouncedAutosave::new(config.autosave_delay());
        Self::new(doc, config, autosave)
    }

    /// Saves to `store` if the debounce deadline has passed. Returns whether a
    /// save happened. A failed save is rescheduled.
    pub fn poll_autosave<S: DocumentStore>(&mut self, now: Instant, store: &S) -> Result<bool> {
        if !self.autosave.fire(now) {
            return Ok(false);
        }
        if let Err(err) = self.save(store) {
            tracing::warn!(location = %store.location().display(), error = %err, "autosave failed, retrying later");
            self.autosave.schedule(now);
            return Err(err);
        }
        tracing::debug!(location = %store.location().display(), "autosaved");
        Ok(true)
    }
}
