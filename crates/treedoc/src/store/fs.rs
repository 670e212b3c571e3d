use super::DocumentStore;
use crate::error::Result;
use crate::format::DocumentFile;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Option<DocumentFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        DocumentFile::from_json(&content).map(Some)
    }

    fn save(&self, file: &DocumentFile) -> Result<()> {
        self.ensure_parent()?;
        let content = file.to_json()?;

        let tmp_file = self.tmp_path();
        fs::write(&tmp_file, content)?;
        if let Err(err) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(err.into());
        }
        tracing::debug!(path = %self.path.display(), nodes = file.nodes.len(), "saved document");
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
