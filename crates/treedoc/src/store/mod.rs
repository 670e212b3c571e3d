//! # Storage Seam
//!
//! The engine holds documents in memory only. Getting a [`DocumentFile`] to and
//! from somewhere durable is the job of a [`DocumentStore`], handed in by the
//! host when it loads a document or when an autosave fires.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemStore`]: keeps the last saved file in memory, for tests and embedding
//! - [`FileStore`]: one pretty-printed JSON file on disk, written atomically

use crate::error::Result;
use crate::format::DocumentFile;
use std::path::PathBuf;

pub mod fs;
pub mod memory;

pub use fs::FileStore;
pub use memory::MemStore;

pub trait DocumentStore {
    /// Reads the stored document.
    /// Returns Ok(None) if nothing has been saved yet.
    fn load(&self) -> Result<Option<DocumentFile>>;

    /// Replaces the stored document.
    /// MUST be atomic: a failed save leaves the previous version intact.
    fn save(&self, file: &DocumentFile) -> Result<()>;

    /// Where the document lives. A virtual path for non-file stores.
    fn location(&self) -> PathBuf;
}
