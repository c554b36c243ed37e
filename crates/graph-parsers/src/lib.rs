//! # Codememo Graph Parsers
//!
//! Ingest call graphs produced by external tools (profilers, static
//! analyzers) into a [`NodeCollection`](codememo_core::NodeCollection).
//!
//! ## Architecture
//!
//! ```text
//! graph source text
//!     │
//!     ├──> GraphParserRegistry (format id, e.g. ".dot" -> parser)
//!     │
//!     └──> GraphParser::parse
//!            ├─ Tokenize + read statements (node ids, labels, edges)
//!            ├─ Unfold shared callees into one node per call site
//!            └─ Attach every call at the default slot
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codememo_graph_parsers::{graph_parser, GraphParser};
//!
//! let parser = graph_parser(".dot").unwrap();
//! let collection = parser.parse(r#"digraph { "main" -> "helper" }"#).unwrap();
//! assert_eq!(collection.resolve_links().len(), 1);
//! ```

mod config;
mod dot;
mod error;
mod parser;

pub use config::DotParserOptions;
pub use dot::DotParser;
pub use error::{ParserError, Result};
pub use parser::{graph_parser, GraphParser, GraphParserRegistry};
