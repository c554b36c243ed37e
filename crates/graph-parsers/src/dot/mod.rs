//! Dot (graphviz) call graphs, as written by profilers such as pycallgraph

mod lexer;
mod syntax;

use crate::config::DotParserOptions;
use crate::error::{ParserError, Result};
use crate::parser::GraphParser;
use codememo_core::{Node, NodeCollection, NodeId, Snippet};
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use syntax::{DotGraph, DotNode, DotReader};

/// Parser for the dot language subset used by call-graph tools
///
/// Every call site becomes its own node: a function called from three
/// places yields three nodes named `f`, `f (0)` and `f (1)`. Recursive
/// calls produce one more occurrence that is not expanded further. All
/// attachments use the default slot since dot carries no line numbers.
#[derive(Debug, Clone, Default)]
pub struct DotParser {
    options: DotParserOptions,
}

impl DotParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DotParserOptions) -> Result<Self> {
        options.validate().map_err(ParserError::InvalidOptions)?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &DotParserOptions {
        &self.options
    }

    fn unfold(&self, graph: &DotGraph) -> Result<NodeCollection> {
        let mut callees: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
        let mut has_caller = vec![false; graph.nodes.len()];
        for &(caller, callee) in &graph.edges {
            callees[caller].push(callee);
            has_caller[callee] = true;
        }

        let mut builder = Unfolder::new(&self.options, graph);
        let mut visited = vec![false; graph.nodes.len()];

        // Entry points first, then whatever only cycles can reach
        let roots: Vec<usize> = (0..graph.nodes.len())
            .filter(|&idx| !has_caller[idx])
            .chain(0..graph.nodes.len())
            .collect();

        for root in roots {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            let root_id = builder.occurrence(root)?;

            let mut queue = VecDeque::from([(root_id, root)]);
            while let Some((caller_id, caller)) = queue.pop_front() {
                for &callee in &callees[caller] {
                    visited[callee] = true;
                    let callee_id = builder.occurrence(callee)?;
                    builder.collection.attach_default(caller_id, callee_id)?;

                    if builder.is_recursive(callee_id, callee) {
                        log::trace!("recursive call to {:?} not expanded", graph.nodes[callee].id);
                    } else {
                        queue.push_back((callee_id, callee));
                    }
                }
            }
        }

        Ok(builder.collection)
    }
}

impl GraphParser for DotParser {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn parse(&self, source: &str) -> Result<NodeCollection> {
        let tokens = lexer::tokenize(source)?;
        let graph = DotReader::new(tokens).read()?;
        log::debug!(
            "Read dot graph: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );

        let collection = self.unfold(&graph)?;
        log::debug!(
            "Unfolded dot graph into {} snippet nodes",
            collection.len()
        );
        Ok(collection)
    }
}

/// Creates one node per occurrence of a dot node, with unique names
struct Unfolder<'a> {
    options: &'a DotParserOptions,
    graph: &'a DotGraph,
    collection: NodeCollection,
    /// Dot node behind each created node, by position
    origin: Vec<usize>,
    /// Every snippet name handed out so far
    used_names: HashSet<String>,
    /// Next `(k)` suffix to try per base label
    next_suffix: HashMap<String, usize>,
}

impl<'a> Unfolder<'a> {
    fn new(options: &'a DotParserOptions, graph: &'a DotGraph) -> Self {
        Self {
            options,
            graph,
            collection: NodeCollection::new(),
            origin: Vec::new(),
            used_names: HashSet::new(),
            next_suffix: HashMap::new(),
        }
    }

    fn occurrence(&mut self, dot_idx: usize) -> Result<NodeId> {
        if self.collection.len() >= self.options.max_nodes {
            return Err(ParserError::TooManyNodes {
                limit: self.options.max_nodes,
            });
        }

        let graph = self.graph;
        let dot_node = &graph.nodes[dot_idx];
        let (base, details) = split_label(dot_node);
        let name = if self.used_names.contains(&base) {
            let next = self.next_suffix.entry(base.clone()).or_insert(0);
            let name = loop {
                let candidate = format!("{base} ({next})");
                *next += 1;
                if !self.used_names.contains(&candidate) {
                    break candidate;
                }
            };
            log::trace!("disambiguating {base:?} as {name:?}");
            name
        } else {
            base
        };
        self.used_names.insert(name.clone());

        let mut snippet = Snippet::new(name, "");
        snippet.lang = self.options.lang.clone();
        let mut node =
            Node::new(snippet).with_ref_info(json!({"parser": "dot", "id": dot_node.id}));
        if self.options.keep_label_details && !details.is_empty() {
            node = node.with_comment(details);
        }

        let id = self.collection.add_node(node);
        self.origin.push(dot_idx);
        Ok(id)
    }

    /// Whether the dot node behind `id` already occurs above it
    fn is_recursive(&self, id: NodeId, dot_idx: usize) -> bool {
        self.collection
            .ancestors(id)
            .into_iter()
            .any(|ancestor| self.origin[ancestor.index()] == dot_idx)
    }
}

/// Display name and remaining detail lines of a dot node
///
/// Labels split on the `\n`, `\l` and `\r` escapes as well as real line
/// breaks. `\N` and a missing or blank label stand for the node id.
fn split_label(node: &DotNode) -> (String, String) {
    let label = match node.label.as_deref() {
        Some(label) if label != "\\N" => label,
        _ => return (node.id.clone(), String::new()),
    };

    let normalized = label
        .replace("\\n", "\n")
        .replace("\\l", "\n")
        .replace("\\r", "\n");
    let mut lines = normalized.lines().map(str::trim);
    let name = match lines.next() {
        Some(first) if !first.is_empty() => first.replace("\\N", &node.id),
        _ => node.id.clone(),
    };
    let details: Vec<&str> = lines.filter(|line| !line.is_empty()).collect();
    (name, details.join("\n"))
}
