//! # Codememo Core
//!
//! An annotated reference graph over code snippets: each snippet can point
//! to other snippets from one of its own lines, forming a browsable
//! call/definition forest.
//!
//! ## Features
//!
//! - **Snippets** - text fragments with language and provenance metadata
//! - **Validated attachments** - no self loops, a single parent per node,
//!   no cycles, slots naming real lines of the parent
//! - **Link resolution** - stable edge lists with same-line disambiguation
//! - **Forest layering** - breadth-first layers per tree for drawing
//! - **Persistence** - flat records replayed through the same validation
//!
//! ## Architecture
//!
//! ```text
//! Snippet ──> Node
//!               │
//!               ├──> NodeCollection (petgraph arena)
//!               │      ├─ attach / detach (validated)
//!               │      ├─ resolve_links / resolve_index_links
//!               │      └─ resolve_tree -> (layers per tree, orphans)
//!               │
//!               └──> CollectionRecord (serde)
//!                      └─ from_record: create nodes, then replay leaves
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codememo_core::{Node, NodeCollection, Snippet};
//!
//! let mut collection = NodeCollection::new();
//! let main = collection.add_node(Node::new(Snippet::new("main", "fn main() {\n    run();\n}")));
//! let run = collection.add_node(Node::new(Snippet::new("run", "fn run() {}")));
//!
//! collection.attach(main, run, 2).unwrap();
//!
//! let (trees, orphans) = collection.resolve_tree();
//! assert_eq!(trees, vec![vec![vec![main], vec![run]]]);
//! assert!(orphans.is_empty());
//! ```

mod collection;
mod error;
mod link;
mod node;
mod snippet;

pub use collection::{CollectionRecord, Layers, NodeCollection};
pub use error::{MemoError, Result};
pub use link::{NodeIndexLink, NodeLink};
pub use node::{Attachment, Leaf, Node, NodeId, NodeRecord, DEFAULT_SLOT};
pub use snippet::Snippet;
