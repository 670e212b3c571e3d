//! # Action Layer
//!
//! This module contains the **core tree logic** of treedoc. Each capability
//! slice lives in its own submodule as plain functions over `&mut Document`.
//!
//! ## Role and Responsibilities
//!
//! Actions are where the real work happens:
//! - Mutate nodes and keep the ancestor registry in step, before returning
//! - Report whether anything changed (`bool`) or what was created (`Option<NodeId>`)
//! - Are completely UI-agnostic
//!
//! ## The Best-Effort Contract
//!
//! Structural actions **silently no-op** for unknown ids, for attempts to move,
//! outdent or delete the root, and for moves past a tree boundary. Callers such
//! as keyboard handlers can invoke them speculatively; the `false` return tells
//! them nothing happened. Only genuinely user-facing rejections (declaring a
//! context outside a blueprint) are reported as errors.
//!
//! ## Testing Strategy
//!
//! **This is where the lion's share of testing lives.** Each module tests its
//! logic directly on small hand-built documents, and every test that mutates
//! structure also checks [`Document::validate`](crate::document::Document::validate)
//! and the registry audit.
//!
//! ## Modules
//!
//! - [`structure`]: indent, outdent, move up/down
//! - [`create`]: create before/after, split
//! - [`paste`]: copy and paste whole fragments
//! - [`content`]: content, status and collapse edits
//! - [`trash`]: soft delete, undelete and the bounded delete buffer
//! - [`context`]: blueprint painting and context declarations
//! - [`applied`]: contexts applied to arbitrary nodes

pub mod applied;
pub mod content;
pub mod context;
pub mod create;
pub mod paste;
pub mod structure;
pub mod trash;
