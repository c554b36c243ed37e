use crate::dot::DotParser;
use crate::error::{ParserError, Result};
use codememo_core::NodeCollection;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Turns an externally produced graph description into a node forest
pub trait GraphParser: Send + Sync {
    /// Short format name for diagnostics
    fn name(&self) -> &'static str;

    /// Parse already-loaded source text
    fn parse(&self, source: &str) -> Result<NodeCollection>;
}

/// Maps format identifiers (file extensions such as `.dot`) to parsers
#[derive(Clone, Default)]
pub struct GraphParserRegistry {
    parsers: BTreeMap<String, Arc<dyn GraphParser>>,
}

static DEFAULT_REGISTRY: Lazy<GraphParserRegistry> = Lazy::new(GraphParserRegistry::with_defaults);

/// Look up a parser in the process-wide default registry
pub fn graph_parser(format: &str) -> Result<&'static dyn GraphParser> {
    DEFAULT_REGISTRY.get(format)
}

impl GraphParserRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser under its usual extensions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let dot: Arc<dyn GraphParser> = Arc::new(DotParser::new());
        registry.register_shared(".dot", Arc::clone(&dot));
        registry.register_shared(".gv", dot);
        registry
    }

    /// Register a parser, replacing any previous one for this format
    pub fn register(&mut self, format: &str, parser: impl GraphParser + 'static) {
        self.register_shared(format, Arc::new(parser));
    }

    /// Register one parser instance under a format
    pub fn register_shared(&mut self, format: &str, parser: Arc<dyn GraphParser>) {
        self.parsers.insert(normalize_format(format), parser);
    }

    pub fn get(&self, format: &str) -> Result<&dyn GraphParser> {
        self.parsers
            .get(&normalize_format(format))
            .map(|parser| parser.as_ref())
            .ok_or_else(|| ParserError::unsupported_format(format))
    }

    /// Parse `source` with the parser registered for `format`
    pub fn parse(&self, format: &str, source: &str) -> Result<NodeCollection> {
        self.get(format)?.parse(source)
    }

    /// Registered formats, sorted
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Format identifier for a file path, taken from its extension
    pub fn format_for_path(path: impl AsRef<Path>) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(normalize_format)
    }
}

impl fmt::Debug for GraphParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.parsers.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

/// Lowercase with a single leading dot: `DOT`, `dot` and `.dot` agree
fn normalize_format(format: &str) -> String {
    format!(".{}", format.trim().trim_start_matches('.').to_lowercase())
}
