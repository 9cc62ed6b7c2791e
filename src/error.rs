use crate::tree::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Error)]
pub enum TreeError {
    /// Create or move under a parent that is missing or not a directory.
    #[error("invalid parent: {0} is not an existing directory")]
    InvalidParent(NodeId),
    /// A required field was empty when a dialog was confirmed.
    #[error("validation failed: {0} must not be empty")]
    ValidationFailed(&'static str),
    #[error("node {0} not found")]
    NotFound(NodeId),
    #[error("node {0} is a directory, not a file")]
    NotAFile(NodeId),
    #[error("moving node {id} under {parent} would create a cycle")]
    Cycle { id: NodeId, parent: NodeId },
    #[error("a dialog is already open")]
    DialogAlreadyOpen,
    #[error("inconsistent tree: {0}")]
    Inconsistent(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TreeError {
    /// Errors the user can fix by re-submitting input, as opposed to
    /// structural errors caused by a caller passing inconsistent ids.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TreeError::ValidationFailed(_))
    }
}

impl From<String> for TreeError {
    fn from(error: String) -> Self {
        TreeError::Parse(error)
    }
}

impl From<&str> for TreeError {
    fn from(error: &str) -> Self {
        TreeError::Parse(error.to_string())
    }
}
