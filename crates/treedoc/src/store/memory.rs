use super::DocumentStore;
use crate::error::{Result, TreeDocError};
use crate::format::DocumentFile;
use std::cell::RefCell;
use std::path::PathBuf;

/// In-memory document store.
///
/// Uses `RefCell` so the `&self` trait methods can record saves; the engine is
/// single-threaded.
#[derive(Debug, Default)]
pub struct MemStore {
    file: RefCell<Option<DocumentFile>>,
    saves: RefCell<usize>,
    simulate_write_error: RefCell<bool>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `file`.
    pub fn with_file(file: DocumentFile) -> Self {
        let store = Self::default();
        *store.file.borrow_mut() = Some(file);
        store
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }

    pub fn last_saved(&self) -> Option<DocumentFile> {
        self.file.borrow().clone()
    }
}

impl DocumentStore for MemStore {
    fn load(&self) -> Result<Option<DocumentFile>> {
        Ok(self.file.borrow().clone())
    }

    fn save(&self, file: &DocumentFile) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(TreeDocError::Store("Simulated write error".to_string()));
        }
        *self.file.borrow_mut() = Some(file.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://document")
    }
}
