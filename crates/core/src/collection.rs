use crate::error::{MemoError, Result};
use crate::link::{NodeIndexLink, NodeLink};
use crate::node::{Attachment, Leaf, Node, NodeId, NodeRecord, DEFAULT_SLOT};
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Index;
use uuid::Uuid;

/// Breadth-first levels of one tree: `layers[0] == [root]`
pub type Layers = Vec<Vec<NodeId>>;

/// Persisted form of a whole collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub nodes: Vec<NodeRecord>,
}

/// Ordered set of snippet nodes forming a forest
///
/// The collection is the arena: nodes are vertices, attachments are edges
/// from parent to child. Nodes are only ever appended, so a [`NodeId`]'s
/// index is its position in collection order.
///
/// Every attachment is validated so that each node has at most one parent
/// and no node is its own ancestor.
#[derive(Debug, Clone, Default)]
pub struct NodeCollection {
    graph: DiGraph<Node, Attachment>,
    next_seq: u64,
}

impl NodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unlinked collection, keeping the given order
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut collection = Self::new();
        for node in nodes {
            collection.add_node(node);
        }
        collection
    }

    /// Append a node; it starts as an orphan
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.graph.add_node(node)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph.node_weight_mut(id)
    }

    /// Node handles in collection order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Nodes in collection order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.graph
            .node_indices()
            .filter_map(move |id| self.graph.node_weight(id).map(|node| (id, node)))
    }

    pub fn find_by_uuid(&self, uuid: &Uuid) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| &node.uuid == uuid)
            .map(|(id, _)| id)
    }

    /// First node (in collection order) whose snippet has this name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.snippet.name == name)
            .map(|(id, _)| id)
    }

    /// Read-only view of the underlying arena
    pub fn graph(&self) -> &DiGraph<Node, Attachment> {
        &self.graph
    }

    /// Parent of a node, if attached
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        self.graph
            .edges_directed(id, Direction::Incoming)
            .min_by_key(|e| e.weight().seq)
            .map(|e| e.source())
    }

    /// Children of a node in attachment order
    pub fn leaves_of(&self, id: NodeId) -> Vec<Leaf> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| (e.weight().seq, e.weight().slot, e.target()))
            .collect();
        edges.sort_unstable_by_key(|&(seq, _, _)| seq);
        edges
            .into_iter()
            .map(|(_, slot, node)| Leaf { slot, node })
            .collect()
    }

    /// Parent chain of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.root_of(id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.root_of(parent);
        }
        chain
    }

    /// Attach `child` under line `slot` of `parent`'s snippet
    ///
    /// Checks run in this order and nothing is modified unless all pass:
    /// self reference, existing different parent, `child` being an ancestor
    /// of `parent`, then `slot` in `[1, n_lines]`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId, slot: usize) -> Result<()> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;

        if parent == child {
            return Err(MemoError::SelfReference(parent_node.uuid));
        }

        if let Some(current) = self.root_of(child) {
            if current != parent {
                return Err(MemoError::MultipleRoot {
                    child: child_node.uuid,
                    current_root: self.graph[current].uuid,
                });
            }
        }

        if self.ancestors(parent).contains(&child) {
            return Err(MemoError::CircularReference {
                parent: parent_node.uuid,
                child: child_node.uuid,
            });
        }

        if !parent_node.snippet.contains_slot(slot) {
            return Err(MemoError::SlotRange {
                parent: parent_node.uuid,
                slot,
                n_lines: parent_node.snippet.n_lines(),
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(parent, child, Attachment { slot, seq });
        Ok(())
    }

    /// [`attach`](Self::attach) at [`DEFAULT_SLOT`]
    pub fn attach_default(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.attach(parent, child, DEFAULT_SLOT)
    }

    /// Detach a node from its parent, returning the former parent and slot
    ///
    /// The node keeps its own children. Order among the remaining siblings
    /// is unchanged.
    pub fn detach(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(child, Direction::Incoming)
            .map(|e| (e.id(), e.weight().seq, e.weight().slot, e.source()))
            .collect();
        let former = incoming
            .iter()
            .min_by_key(|&&(_, seq, _, _)| seq)
            .map(|&(_, _, slot, parent)| (parent, slot));

        // Edge removal moves the last edge into the freed index, so remove
        // from the highest index down.
        incoming.sort_unstable_by_key(|&(edge, _, _, _)| std::cmp::Reverse(edge));
        for (edge, _, _, _) in incoming {
            self.graph.remove_edge(edge);
        }
        former
    }

    /// Resolve every attachment into a [`NodeLink`]
    ///
    /// Nodes are visited in collection order and children in attachment
    /// order; `leaf_slot` counts earlier siblings on the same `root_slot`.
    pub fn resolve_links(&self) -> Vec<NodeLink> {
        let mut links = Vec::new();
        for root in self.ids() {
            let mut seen_per_slot: HashMap<usize, usize> = HashMap::new();
            for leaf in self.leaves_of(root) {
                let rank = seen_per_slot.entry(leaf.slot).or_insert(0);
                links.push(NodeLink::new(root, leaf.slot, leaf.node, *rank));
                *rank += 1;
            }
        }
        links
    }

    /// [`resolve_links`](Self::resolve_links) with nodes given by position
    pub fn resolve_index_links(&self) -> Vec<NodeIndexLink> {
        self.resolve_links()
            .into_iter()
            .map(NodeLink::to_index_link)
            .collect()
    }

    /// Lay the forest out into breadth-first layers
    ///
    /// Returns one [`Layers`] per tree root (a parentless node with
    /// children), in collection order, plus the orphans (parentless and
    /// childless nodes), also in collection order.
    pub fn resolve_tree(&self) -> (Vec<Layers>, Vec<NodeId>) {
        let mut trees = Vec::new();
        let mut orphans = Vec::new();

        for id in self.ids() {
            if self.root_of(id).is_some() {
                continue;
            }
            if self.leaves_of(id).is_empty() {
                orphans.push(id);
                continue;
            }

            let mut layers: Layers = vec![vec![id]];
            loop {
                let next: Vec<NodeId> = layers
                    .last()
                    .into_iter()
                    .flatten()
                    .flat_map(|&node| self.leaves_of(node))
                    .map(|leaf| leaf.node)
                    .collect();
                if next.is_empty() {
                    break;
                }
                layers.push(next);
            }
            trees.push(layers);
        }

        (trees, orphans)
    }

    /// Flat record of one node with linkage expressed as uuids
    pub fn node_record(&self, id: NodeId) -> Result<NodeRecord> {
        let node = self.get(id)?;
        let (root, leaves) = self.linkage(id);
        Ok(node.to_record(root, leaves))
    }

    pub fn to_record(&self) -> CollectionRecord {
        let nodes = self
            .iter()
            .map(|(id, node)| {
                let (root, leaves) = self.linkage(id);
                node.to_record(root, leaves)
            })
            .collect();
        CollectionRecord { nodes }
    }

    /// Rebuild a collection from its record
    ///
    /// All nodes are created unlinked first, then every recorded leaf is
    /// replayed through [`attach`](Self::attach). A record that breaks any
    /// attachment rule, names an unknown or duplicated uuid, or whose `root`
    /// disagrees with the replayed parent is rejected.
    pub fn from_record(record: &CollectionRecord) -> Result<Self> {
        let mut collection = Self::new();
        let mut by_uuid: HashMap<Uuid, NodeId> = HashMap::with_capacity(record.nodes.len());

        for node_record in &record.nodes {
            let id = collection.add_node(Node::from_record(node_record));
            if by_uuid.insert(node_record.uuid, id).is_some() {
                return Err(MemoError::invalid_document(format!(
                    "duplicate node uuid {}",
                    node_record.uuid
                )));
            }
        }

        for node_record in &record.nodes {
            let parent = by_uuid[&node_record.uuid];
            for &(child_uuid, slot) in &node_record.leaves {
                let child = by_uuid.get(&child_uuid).copied().ok_or_else(|| {
                    MemoError::invalid_document(format!(
                        "node {} lists unknown leaf {child_uuid}",
                        node_record.uuid
                    ))
                })?;
                collection
                    .attach(parent, child, slot)
                    .map_err(|source| MemoError::Replay {
                        parent: node_record.uuid,
                        child: child_uuid,
                        source: Box::new(source),
                    })?;
            }
        }

        for node_record in &record.nodes {
            let id = by_uuid[&node_record.uuid];
            let replayed = collection
                .root_of(id)
                .map(|parent| collection.graph[parent].uuid);
            if replayed != node_record.root {
                return Err(MemoError::invalid_document(format!(
                    "node {} records root {:?} but is attached to {:?}",
                    node_record.uuid, node_record.root, replayed
                )));
            }
        }

        Ok(collection)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_record())?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let record: CollectionRecord = serde_json::from_value(value)?;
        Self::from_record(&record)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let record: CollectionRecord = serde_json::from_str(text)?;
        Self::from_record(&record)
    }

    fn linkage(&self, id: NodeId) -> (Option<Uuid>, Vec<(Uuid, usize)>) {
        let root = self.root_of(id).map(|parent| self.graph[parent].uuid);
        let leaves = self
            .leaves_of(id)
            .into_iter()
            .map(|leaf| (self.graph[leaf.node].uuid, leaf.slot))
            .collect();
        (root, leaves)
    }

    fn get(&self, id: NodeId) -> Result<&Node> {
        self.graph
            .node_weight(id)
            .ok_or_else(|| MemoError::NodeNotFound(format!("index {}", id.index())))
    }
}

impl Index<NodeId> for NodeCollection {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.graph[id]
    }
}
