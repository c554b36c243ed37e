use crate::snippet::Snippet;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Handle of a node inside its owning [`NodeCollection`](crate::NodeCollection)
///
/// `index()` is the node's position in collection order.
pub type NodeId = NodeIndex;

/// Slot used when an attachment does not name one: the first line
pub const DEFAULT_SLOT: usize = 1;

/// A graph vertex wrapping one snippet
///
/// Linkage (parent and children) lives in the owning collection, see
/// [`NodeCollection::root_of`](crate::NodeCollection::root_of) and
/// [`NodeCollection::leaves_of`](crate::NodeCollection::leaves_of).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub uuid: Uuid,
    pub snippet: Snippet,
    pub comment: Option<String>,

    /// Opaque metadata from an external parser (tool name, source id)
    pub ref_info: Option<Value>,
}

impl Node {
    pub fn new(snippet: Snippet) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            snippet,
            comment: None,
            ref_info: None,
        }
    }

    /// Builder: use a known uuid instead of a generated one
    #[must_use]
    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Builder: set comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder: set parser metadata
    #[must_use]
    pub fn with_ref_info(mut self, ref_info: Value) -> Self {
        self.ref_info = Some(ref_info);
        self
    }

    /// Flatten into a record, linkage given by uuid
    #[must_use]
    pub fn to_record(&self, root: Option<Uuid>, leaves: Vec<(Uuid, usize)>) -> NodeRecord {
        NodeRecord {
            uuid: self.uuid,
            snippet: self.snippet.clone(),
            comment: self.comment.clone(),
            root,
            leaves,
            ref_info: self.ref_info.clone(),
        }
    }

    /// Rebuild an unlinked node from its record
    ///
    /// `root` and `leaves` of the record are ignored here; restoring them
    /// goes through [`NodeCollection::from_record`](crate::NodeCollection::from_record).
    #[must_use]
    pub fn from_record(record: &NodeRecord) -> Self {
        Self {
            uuid: record.uuid,
            snippet: record.snippet.clone(),
            comment: record.comment.clone(),
            ref_info: record.ref_info.clone(),
        }
    }
}

/// One child of a node, in attachment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Leaf {
    /// Line of the parent's snippet the child hangs from
    pub slot: usize,
    pub node: NodeId,
}

/// Edge weight stored in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub slot: usize,
    /// Monotone counter giving attachment order among a parent's children
    pub seq: u64,
}

/// Flat, persisted form of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uuid: Uuid,
    pub snippet: Snippet,

    #[serde(deserialize_with = "Option::deserialize")]
    pub comment: Option<String>,

    /// Parent uuid
    #[serde(deserialize_with = "Option::deserialize")]
    pub root: Option<Uuid>,

    /// `(child uuid, slot)` pairs in attachment order
    pub leaves: Vec<(Uuid, usize)>,

    #[serde(deserialize_with = "Option::deserialize")]
    pub ref_info: Option<Value>,
}
