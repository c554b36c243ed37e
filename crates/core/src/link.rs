use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A resolved parent -> child attachment
///
/// `root_slot` is the line of the parent's snippet the child hangs from.
/// `leaf_slot` is the child's 0-based rank among the parent's children
/// sharing that same `root_slot`, in attachment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeLink {
    pub root: NodeId,
    pub root_slot: usize,
    pub leaf: NodeId,
    pub leaf_slot: usize,
}

impl NodeLink {
    pub const fn new(root: NodeId, root_slot: usize, leaf: NodeId, leaf_slot: usize) -> Self {
        Self {
            root,
            root_slot,
            leaf,
            leaf_slot,
        }
    }

    /// Replace node handles with their positions in collection order
    #[must_use]
    pub fn to_index_link(self) -> NodeIndexLink {
        NodeIndexLink::new(
            self.root.index(),
            self.root_slot,
            self.leaf.index(),
            self.leaf_slot,
        )
    }
}

/// [`NodeLink`] with nodes given by position in a collection snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIndexLink {
    pub root: usize,
    pub root_slot: usize,
    pub leaf: usize,
    pub leaf_slot: usize,
}

impl NodeIndexLink {
    pub const fn new(root: usize, root_slot: usize, leaf: usize, leaf_slot: usize) -> Self {
        Self {
            root,
            root_slot,
            leaf,
            leaf_slot,
        }
    }
}
