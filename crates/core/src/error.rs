use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, MemoError>;

#[derive(Error, Debug)]
pub enum MemoError {
    #[error("Self reference: node {0} cannot be attached to itself")]
    SelfReference(Uuid),

    #[error("Multiple root: node {child} is already attached to {current_root}")]
    MultipleRoot { child: Uuid, current_root: Uuid },

    #[error("Circular reference: node {child} is an ancestor of {parent}")]
    CircularReference { parent: Uuid, child: Uuid },

    #[error("Slot {slot} of node {parent} should be in the range [1, {n_lines}]")]
    SlotRange {
        parent: Uuid,
        slot: usize,
        n_lines: usize,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid document: cannot attach {child} under {parent}: {source}")]
    Replay {
        parent: Uuid,
        child: Uuid,
        #[source]
        source: Box<MemoError>,
    },
}

impl MemoError {
    /// Create an invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}
