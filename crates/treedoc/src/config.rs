//! # Configuration
//!
//! Engine settings are declared with [`confique`], which handles layered
//! loading from a TOML file and environment variables.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `TREEDOC_DELETE_BUFFER_CAPACITY`, etc.
//! 2. **Config file**: the TOML file passed to [`EngineConfig::load`].
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `delete_buffer_capacity` | `10` | Restorable delete groups kept |
//! | `autosave_debounce_ms` | `2000` | Quiet period before an autosave fires |
//! | `history_limit` | `100` | Undo stack depth, `0` for unbounded |
//! | `audit_registry` | debug builds only | Check the ancestor registry after every mutation |
//! | `author` | `""` | Written into saved documents |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the engine, usually stored in `treedoc.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of delete operations that can be undone.
    #[config(env = "TREEDOC_DELETE_BUFFER_CAPACITY", default = 10)]
    pub delete_buffer_capacity: usize,

    /// Milliseconds without changes before an autosave fires.
    #[config(env = "TREEDOC_AUTOSAVE_DEBOUNCE_MS", default = 2000)]
    pub autosave_debounce_ms: u64,

    /// Maximum undo depth. 0 keeps everything.
    #[config(env = "TREEDOC_HISTORY_LIMIT", default = 100)]
    pub history_limit: usize,

    /// Rebuild and compare the ancestor registry after each mutation.
    /// When absent, enabled in debug builds only.
    #[config(env = "TREEDOC_AUDIT_REGISTRY")]
    pub audit_registry: Option<bool>,

    #[config(env = "TREEDOC_AUTHOR", default = "")]
    pub author: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delete_buffer_capacity: 10,
            autosave_debounce_ms: 2000,
            history_limit: 100,
            audit_registry: None,
            author: String::new(),
        }
    }
}

impl EngineConfig {
    /// Loads environment overrides on top of `path` (if it exists) on top of
    /// the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::builder().env().file(path.as_ref()).load()?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded engine config");
        Ok(config)
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit_registry.unwrap_or(cfg!(debug_assertions))
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
