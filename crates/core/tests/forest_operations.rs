//! Tests for attachment rules, link resolution and forest layering

use codememo_core::{MemoError, Node, NodeCollection, NodeId, NodeIndexLink, NodeLink, Snippet};
use pretty_assertions::assert_eq;

fn dummy_nodes() -> (NodeCollection, Vec<NodeId>) {
    let data = [
        ("foo.py", "def foo():\n    print(\"foo\")", "python"),
        ("bar.py", "def bar():\n    print(\"bar\")", "python"),
        ("buzz.py", "def buzz():\n    print(\"buzz\")", "python"),
        ("gin.py", "def gin():\n    print(\"gin\")", "python"),
        ("fizz.py", "def fizz():\n    print(\"fizz\")", "python"),
        (
            "greet.c",
            "int main(void) {\n  printf(\"Hello world!\\n\");\n  return 0;\n}",
            "c",
        ),
    ];
    let collection = NodeCollection::from_nodes(
        data.iter()
            .map(|(name, content, lang)| Node::new(Snippet::new(*name, *content).lang(*lang))),
    );
    let ids = collection.ids().collect();
    (collection, ids)
}

/// Forest `0 -> {1, 2}, 2 -> 3, 5 -> 6, 6 -> {7, 8}, 7 -> 9` plus isolated 4
fn multiple_tree() -> (NodeCollection, Vec<NodeId>) {
    let names = [
        "0_0", "0_1", "0_2", "0_3", "0_4", "1_0", "1_1", "1_2", "1_3", "1_4",
    ];
    let mut collection = NodeCollection::from_nodes(
        names
            .iter()
            .map(|name| Node::new(Snippet::new(*name, "def foo():\n    print(\"foo\")"))),
    );
    let n: Vec<NodeId> = collection.ids().collect();

    collection.attach_default(n[0], n[1]).unwrap();
    collection.attach_default(n[0], n[2]).unwrap();
    collection.attach_default(n[2], n[3]).unwrap();
    collection.attach_default(n[5], n[6]).unwrap();
    collection.attach_default(n[6], n[7]).unwrap();
    collection.attach_default(n[6], n[8]).unwrap();
    collection.attach_default(n[7], n[9]).unwrap();
    (collection, n)
}

#[test]
fn test_attach_self_reference() {
    let (mut collection, n) = dummy_nodes();
    let err = collection.attach_default(n[0], n[0]).unwrap_err();
    assert!(matches!(err, MemoError::SelfReference(_)));
    assert!(err.to_string().contains("Self reference"));
}

#[test]
fn test_attach_circular_reference() {
    let (mut collection, n) = dummy_nodes();
    collection.attach_default(n[0], n[1]).unwrap();

    let err = collection.attach_default(n[1], n[0]).unwrap_err();
    assert!(matches!(err, MemoError::CircularReference { .. }));
    assert!(err.to_string().contains("Circular reference"));
}

#[test]
fn test_attach_circular_reference_through_chain() {
    let (mut collection, n) = dummy_nodes();
    collection.attach_default(n[0], n[1]).unwrap();
    collection.attach_default(n[1], n[2]).unwrap();

    let err = collection.attach_default(n[2], n[0]).unwrap_err();
    assert!(matches!(err, MemoError::CircularReference { .. }));
    assert!(collection.leaves_of(n[2]).is_empty());
}

#[test]
fn test_attach_multiple_root() {
    let (mut collection, n) = dummy_nodes();
    collection.attach_default(n[0], n[1]).unwrap();

    let err = collection.attach_default(n[2], n[1]).unwrap_err();
    assert!(matches!(err, MemoError::MultipleRoot { .. }));
    assert!(err.to_string().contains("Multiple root"));
    assert_eq!(collection.root_of(n[1]), Some(n[0]));
}

#[test]
fn test_attach_exceeding_range() {
    let (mut collection, n) = dummy_nodes();
    let n_lines = collection[n[0]].snippet.n_lines();

    for slot in [0, n_lines + 1] {
        let err = collection.attach(n[0], n[1], slot).unwrap_err();
        assert!(matches!(err, MemoError::SlotRange { .. }));
        assert!(err.to_string().contains("should be in the range"));
    }
    assert!(collection.resolve_links().is_empty());

    collection.attach(n[0], n[1], n_lines).unwrap();
}

#[test]
fn test_attach_again_under_same_parent() {
    let (mut collection, n) = dummy_nodes();
    collection.attach(n[0], n[1], 1).unwrap();
    collection.attach(n[0], n[1], 2).unwrap();

    assert_eq!(collection.root_of(n[1]), Some(n[0]));
    assert_eq!(
        collection.resolve_links(),
        vec![
            NodeLink::new(n[0], 1, n[1], 0),
            NodeLink::new(n[0], 2, n[1], 0),
        ]
    );

    // Both attachments survive a save and reload
    let reloaded = NodeCollection::from_json(&collection.to_json().unwrap()).unwrap();
    assert_eq!(reloaded.resolve_index_links(), collection.resolve_index_links());
}

#[test]
fn test_arena_edges_mirror_attachments() {
    let (collection, _) = multiple_tree();
    let graph = collection.graph();
    assert_eq!(graph.node_count(), collection.len());
    assert_eq!(graph.edge_count(), collection.resolve_links().len());

    let mut seqs: Vec<u64> = graph.edge_weights().map(|a| a.seq).collect();
    seqs.sort_unstable();
    seqs.dedup();
    assert_eq!(seqs.len(), graph.edge_count());
    assert!(graph.edge_weights().all(|a| a.slot == 1));
}

#[test]
fn test_node_mut_edits_in_place() {
    let (mut collection, n) = multiple_tree();
    collection.node_mut(n[2]).unwrap().comment = Some("called twice".to_string());

    assert_eq!(collection[n[2]].comment.as_deref(), Some("called twice"));
    assert_eq!(collection.root_of(n[2]), Some(n[0]));
    let record = collection.node_record(n[2]).unwrap();
    assert_eq!(record.comment.as_deref(), Some("called twice"));
    assert_eq!(record.leaves, vec![(collection[n[3]].uuid, 1)]);
    assert!(collection.node_mut(NodeId::new(99)).is_none());
}

#[test]
fn test_self_reference_is_checked_before_slot_range() {
    let (mut collection, n) = dummy_nodes();
    let err = collection.attach(n[0], n[0], 99).unwrap_err();
    assert!(matches!(err, MemoError::SelfReference(_)));
}

#[test]
fn test_multiple_root_is_checked_before_cycle() {
    let (mut collection, n) = dummy_nodes();
    collection.attach_default(n[0], n[1]).unwrap();
    collection.attach_default(n[1], n[2]).unwrap();
    collection.attach_default(n[3], n[0]).unwrap();

    // n[0] already has a parent and is also an ancestor of n[2]
    let err = collection.attach_default(n[2], n[0]).unwrap_err();
    assert!(matches!(err, MemoError::MultipleRoot { .. }));
}

#[test]
fn test_slot_uses_parent_line_count() {
    let (mut collection, n) = dummy_nodes();
    // greet.c has four lines
    collection.attach(n[5], n[0], 4).unwrap();
    assert!(collection.attach(n[5], n[1], 5).is_err());
}

#[test]
fn test_resolve_links() {
    let (collection, n) = multiple_tree();
    let links = collection.resolve_links();
    let desired_links = vec![
        NodeLink::new(n[0], 1, n[1], 0),
        NodeLink::new(n[0], 1, n[2], 1),
        NodeLink::new(n[2], 1, n[3], 0),
        NodeLink::new(n[5], 1, n[6], 0),
        NodeLink::new(n[6], 1, n[7], 0),
        NodeLink::new(n[6], 1, n[8], 1),
        NodeLink::new(n[7], 1, n[9], 0),
    ];
    assert_eq!(links, desired_links);
}

#[test]
fn test_resolve_index_links() {
    let (collection, _) = multiple_tree();
    let links = collection.resolve_index_links();
    let desired_links = vec![
        NodeIndexLink::new(0, 1, 1, 0),
        NodeIndexLink::new(0, 1, 2, 1),
        NodeIndexLink::new(2, 1, 3, 0),
        NodeIndexLink::new(5, 1, 6, 0),
        NodeIndexLink::new(6, 1, 7, 0),
        NodeIndexLink::new(6, 1, 8, 1),
        NodeIndexLink::new(7, 1, 9, 0),
    ];
    assert_eq!(links, desired_links);

    let from_links: Vec<NodeIndexLink> = collection
        .resolve_links()
        .into_iter()
        .map(NodeLink::to_index_link)
        .collect();
    assert_eq!(from_links, links);
}

#[test]
fn test_resolve_tree() {
    let (collection, n) = multiple_tree();
    let (layer_collection, orphans) = collection.resolve_tree();
    let desired_trees = vec![
        vec![vec![n[0]], vec![n[1], n[2]], vec![n[3]]],
        vec![vec![n[5]], vec![n[6]], vec![n[7], n[8]], vec![n[9]]],
    ];
    assert_eq!(layer_collection, desired_trees);
    assert_eq!(orphans, vec![n[4]]);
}

#[test]
fn test_resolve_tree_follows_attachment_order_not_insertion_order() {
    let (mut collection, n) = dummy_nodes();
    collection.attach_default(n[0], n[3]).unwrap();
    collection.attach_default(n[0], n[1]).unwrap();
    collection.attach_default(n[1], n[4]).unwrap();
    collection.attach_default(n[3], n[2]).unwrap();

    let (trees, orphans) = collection.resolve_tree();
    assert_eq!(
        trees,
        vec![vec![vec![n[0]], vec![n[3], n[1]], vec![n[2], n[4]]]]
    );
    assert_eq!(orphans, vec![n[5]]);
}

#[test]
fn test_detached_subtree_becomes_its_own_tree() {
    let (mut collection, n) = multiple_tree();
    assert_eq!(collection.detach(n[6]), Some((n[5], 1)));

    let (trees, orphans) = collection.resolve_tree();
    assert_eq!(
        trees,
        vec![
            vec![vec![n[0]], vec![n[1], n[2]], vec![n[3]]],
            vec![vec![n[6]], vec![n[7], n[8]], vec![n[9]]],
        ]
    );
    assert_eq!(orphans, vec![n[4], n[5]]);
}

#[test]
fn test_ancestors() {
    let (collection, n) = multiple_tree();
    assert_eq!(collection.ancestors(n[9]), vec![n[7], n[6], n[5]]);
    assert!(collection.ancestors(n[5]).is_empty());
}
