//! # Treedoc Architecture
//!
//! Treedoc is the **document engine of an outliner**: a tree of nodes with
//! text, status and open metadata, and the structural edits an outliner
//! needs. It has no UI, no cursor, no keyboard handling and performs no I/O
//! unless the host asks it to.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - TreeDocApi: one entry point per operation                │
//! │  - Routes undoable edits through the command history        │
//! │  - Fires the injected autosave trigger after each change    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  Action Layer (actions/*.rs) │ │  History (history/)        │
//! │  - Tree logic as functions   │◀│  - Command trait           │
//! │    over &mut Document        │ │  - Undo/redo stacks        │
//! │  - Soft-delete buffer        │ │  - Snapshotting commands   │
//! └──────────────────────────────┘ └────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Document Layer (document.rs, registry.rs, model.rs)        │
//! │  - Arena of nodes keyed by id                               │
//! │  - Incrementally maintained ancestor paths                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Seam (format.rs, store/)                           │
//! │  - Persisted JSON shape with legacy migration               │
//! │  - DocumentStore trait: MemStore, FileStore                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: The Tree Is Always Consistent
//!
//! Every public operation leaves the document fully connected (each non-root
//! node listed in exactly one `children` list) with the ancestor registry
//! matching the real tree. Operations that cannot apply (unknown id, the
//! root, a tree boundary) do nothing and say so through their return value;
//! they do not error.
//!
//! ## Testing Strategy
//!
//! 1. **Actions** (`actions/*.rs`): Thorough unit tests on small hand-built
//!    trees. This is where the lion's share of testing lives.
//! 2. **History** (`history/`): Execute, undo and redo of each command.
//! 3. **API** (`api.rs`): Dispatch, autosave and undo wiring.
//! 4. **Integration** (`tests/`): Long pseudo-random edit sequences checked
//!    against a registry rebuilt from scratch, and persistence round trips.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`actions`]: Tree logic, one module per capability
//! - [`history`]: Undoable commands and the undo/redo stacks
//! - [`document`]: The node store
//! - [`registry`]: Ancestor path cache and its audit
//! - [`model`]: `Node`, `NodeMetadata`, `NodeStatus`
//! - [`format`]: Persisted document shape
//! - [`store`]: Storage seam and implementations
//! - [`autosave`]: Autosave triggers and the debouncer
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod actions;
pub mod api;
pub mod autosave;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod history;
pub mod model;
pub mod registry;
pub mod store;

pub use api::TreeDocApi;
pub use document::Document;
pub use error::{Result, TreeDocError};
pub use model::{Node, NodeId, NodeMetadata, NodeStatus};
