//! # Command History
//!
//! Undo/redo for mutations whose inverse is not simply "run the opposite
//! action". Each such mutation is a [`Command`] that captures whatever it needs
//! to reverse itself (usually a snapshot of the nodes it touched) when it
//! executes.
//!
//! [`CommandHistory`] keeps two stacks:
//!
//! - executing a command pushes it on the undo stack and clears the redo stack
//! - undo pops it, reverses it, and pushes it on the redo stack
//! - redo pops it, re-applies it, and pushes it back on the undo stack
//!
//! A command that reports it changed nothing is not recorded. A command whose
//! undo or redo fails stays on the stack it came from, so the history never
//! claims a state the document is not in.
//!
//! Structural edits and soft deletes do not go through here; deletes have
//! their own restore path in the
//! [`DeletionBuffer`](crate::actions::trash::DeletionBuffer).

pub mod content;
pub mod metadata;
pub mod subtree;

pub use content::EditContentCommand;
pub use metadata::{BlueprintCommand, BlueprintOp};
pub use subtree::ReplaceSubtreeCommand;

use crate::document::Document;
use crate::error::Result;
use std::fmt;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

pub trait Command {
    /// Short human-readable name, e.g. for an "Undo declare context" menu item.
    fn label(&self) -> String;

    /// Applies the command. Returns `false` if nothing changed.
    fn execute(&mut self, doc: &mut Document) -> Result<bool>;

    fn undo(&mut self, doc: &mut Document) -> Result<()>;

    fn redo(&mut self, doc: &mut Document) -> Result<()> {
        self.execute(doc).map(|_| ())
    }
}

pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    limit: usize,
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = |stack: &[Box<dyn Command>]| stack.iter().map(|c| c.label()).collect::<Vec<_>>();
        f.debug_struct("CommandHistory")
            .field("undo", &labels(&self.undo_stack))
            .field("redo", &labels(&self.redo_stack))
            .field("limit", &self.limit)
            .finish()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// `limit` caps the undo stack; 0 means unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Executes `command` and records it. Returns whether anything changed.
    pub fn execute_command(&mut self, doc: &mut Document, mut command: Box<dyn Command>) -> Result<bool> {
        let changed = command.execute(doc)?;
        if !changed {
            return Ok(false);
        }
        tracing::debug!(command = %command.label(), "executed command");
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        Ok(true)
    }

    /// Reverses the most recent command. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(doc) {
            self.undo_stack.push(command);
            return Err(err);
        }
        tracing::debug!(command = %command.label(), "undid command");
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-applies the most recently undone command. `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.redo(doc) {
            self.redo_stack.push(command);
            return Err(err);
        }
        tracing::debug!(command = %command.label(), "redid command");
        self.undo_stack.push(command);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_label(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.label())
    }

    pub fn redo_label(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.label())
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
