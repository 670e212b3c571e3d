use thiserror::Error;

use crate::model::NodeId;

#[derive(Error, Debug)]
pub enum TreeDocError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Cannot declare '{0}' as a context: its parent is not part of a blueprint")]
    ParentNotBlueprint(NodeId),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, TreeDocError>;
