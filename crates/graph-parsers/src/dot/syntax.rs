use super::lexer::{Token, TokenKind};
use crate::error::{ParserError, Result};
use std::collections::HashMap;

/// Deepest subgraph nesting accepted inside the graph body
const MAX_SUBGRAPH_DEPTH: usize = 256;

/// A node declared in a dot graph, in first-appearance order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DotNode {
    pub id: String,
    pub label: Option<String>,
}

/// Nodes and directed edges of a dot graph; edges index into `nodes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DotGraph {
    pub directed: bool,
    pub nodes: Vec<DotNode>,
    pub edges: Vec<(usize, usize)>,
}

impl DotGraph {
    fn node_index(&mut self, id: &str, by_id: &mut HashMap<String, usize>) -> usize {
        if let Some(&idx) = by_id.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(DotNode {
            id: id.to_string(),
            label: None,
        });
        by_id.insert(id.to_string(), idx);
        idx
    }
}

/// Recursive-descent reader for the dot statement grammar
///
/// Only what is needed to recover node ids, labels and edges is kept;
/// every other attribute is read and dropped.
pub(crate) struct DotReader {
    tokens: Vec<Token>,
    pos: usize,
    graph: DotGraph,
    by_id: HashMap<String, usize>,
    depth: usize,
}

impl DotReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            graph: DotGraph::default(),
            by_id: HashMap::new(),
            depth: 0,
        }
    }

    pub fn read(mut self) -> Result<DotGraph> {
        if self.peek_keyword().as_deref() == Some("strict") {
            self.pos += 1;
        }
        match self.peek_keyword().as_deref() {
            Some("digraph") => self.graph.directed = true,
            Some("graph") => self.graph.directed = false,
            _ => return Err(self.error("expected `graph` or `digraph`")),
        }
        self.pos += 1;

        if matches!(self.peek_kind(), Some(TokenKind::Id { .. })) {
            self.pos += 1;
        }
        self.expect(&TokenKind::LBrace, "`{`")?;
        self.read_statements()?;
        self.expect(&TokenKind::RBrace, "`}`")?;

        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected content after graph body"));
        }
        Ok(self.graph)
    }

    fn read_statements(&mut self) -> Result<()> {
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::RBrace) => return Ok(()),
                Some(TokenKind::Semicolon) => self.pos += 1,
                _ => self.read_statement()?,
            }
        }
    }

    fn read_statement(&mut self) -> Result<()> {
        match self.peek_keyword().as_deref() {
            Some("graph" | "node" | "edge") => {
                self.pos += 1;
                self.read_attributes()?;
                return Ok(());
            }
            Some("subgraph") => return self.read_subgraph(),
            _ => {}
        }
        if self.peek_kind() == Some(&TokenKind::LBrace) {
            return self.read_subgraph();
        }

        let id = self.read_id("node id")?;

        // `id = value` sets a graph attribute
        if self.peek_kind() == Some(&TokenKind::Equals) {
            self.pos += 1;
            self.read_id("attribute value")?;
            return Ok(());
        }

        self.skip_port()?;
        let first = self.graph.node_index(&id, &mut self.by_id);

        if matches!(self.peek_kind(), Some(TokenKind::Arrow | TokenKind::Line)) {
            let mut source = first;
            while let Some(kind) = self.peek_kind().cloned() {
                match (kind, self.graph.directed) {
                    (TokenKind::Arrow, true) | (TokenKind::Line, false) => self.pos += 1,
                    (TokenKind::Arrow, false) => {
                        return Err(self.error("`->` used in an undirected graph"))
                    }
                    (TokenKind::Line, true) => {
                        return Err(self.error("`--` used in a directed graph"))
                    }
                    _ => break,
                }
                if self.peek_keyword().as_deref() == Some("subgraph")
                    || self.peek_kind() == Some(&TokenKind::LBrace)
                {
                    return Err(self.error("subgraph edge endpoints are not supported"));
                }
                let target_id = self.read_id("edge target")?;
                self.skip_port()?;
                let target = self.graph.node_index(&target_id, &mut self.by_id);
                self.graph.edges.push((source, target));
                source = target;
            }
            self.read_attributes()?;
        } else {
            let attributes = self.read_attributes()?;
            if let Some(label) = attributes.get("label") {
                self.graph.nodes[first].label = Some(label.clone());
            }
        }
        Ok(())
    }

    fn read_subgraph(&mut self) -> Result<()> {
        if self.peek_keyword().as_deref() == Some("subgraph") {
            self.pos += 1;
            if matches!(self.peek_kind(), Some(TokenKind::Id { .. })) {
                self.pos += 1;
            }
        }
        self.expect(&TokenKind::LBrace, "`{`")?;
        if self.depth == MAX_SUBGRAPH_DEPTH {
            return Err(self.error("subgraphs nested too deeply"));
        }
        self.depth += 1;
        self.read_statements()?;
        self.depth -= 1;
        self.expect(&TokenKind::RBrace, "`}`")
    }

    /// Zero or more `[a=b, c=d; ...]` lists; later keys win
    fn read_attributes(&mut self) -> Result<HashMap<String, String>> {
        let mut attributes = HashMap::new();
        while self.peek_kind() == Some(&TokenKind::LBracket) {
            self.pos += 1;
            loop {
                match self.peek_kind() {
                    Some(TokenKind::RBracket) => {
                        self.pos += 1;
                        break;
                    }
                    Some(TokenKind::Comma | TokenKind::Semicolon) => self.pos += 1,
                    Some(TokenKind::Id { .. }) => {
                        let key = self.read_id("attribute name")?;
                        self.expect(&TokenKind::Equals, "`=`")?;
                        let value = self.read_id("attribute value")?;
                        attributes.insert(key, value);
                    }
                    _ => return Err(self.error("expected attribute or `]`")),
                }
            }
        }
        Ok(attributes)
    }

    fn skip_port(&mut self) -> Result<()> {
        // node:port:compass
        for _ in 0..2 {
            if self.peek_kind() != Some(&TokenKind::Colon) {
                break;
            }
            self.pos += 1;
            self.read_id("port")?;
        }
        Ok(())
    }

    /// An identifier, joining `"a" + "b"` concatenations
    fn read_id(&mut self, what: &str) -> Result<String> {
        let (mut text, quoted) = match self.peek_kind() {
            Some(TokenKind::Id { text, quoted }) => (text.clone(), *quoted),
            _ => return Err(self.error(format!("expected {what}"))),
        };
        self.pos += 1;

        while quoted && self.peek_kind() == Some(&TokenKind::Plus) {
            self.pos += 1;
            match self.peek_kind() {
                Some(TokenKind::Id {
                    text: more,
                    quoted: true,
                }) => {
                    text.push_str(more);
                    self.pos += 1;
                }
                _ => return Err(self.error("expected quoted string after `+`")),
            }
        }
        Ok(text)
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_keyword(&self) -> Option<String> {
        self.tokens.get(self.pos).and_then(Token::keyword)
    }

    fn error(&self, message: impl Into<String>) -> ParserError {
        let line = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line);
        ParserError::parse(line, message)
    }
}
