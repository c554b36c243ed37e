use crate::config::CliConfig;
use anyhow::{anyhow, Context, Result};
use codememo_core::{NodeCollection, NodeId};
use codememo_graph_parsers::{DotParser, GraphParser, GraphParserRegistry};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ImportRequest {
    pub input: PathBuf,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
}

/// Runs commands against already-resolved configuration
pub struct Runner {
    config: CliConfig,
    registry: GraphParserRegistry,
}

impl Runner {
    pub fn new(config: CliConfig) -> Result<Self> {
        let dot: Arc<dyn GraphParser> = Arc::new(DotParser::with_options(config.import.clone())?);
        let mut registry = GraphParserRegistry::new();
        registry.register_shared(".dot", Arc::clone(&dot));
        registry.register_shared(".gv", dot);
        Ok(Self { config, registry })
    }

    pub fn import(&self, request: ImportRequest) -> Result<()> {
        let format = match request.format {
            Some(format) => format,
            None => GraphParserRegistry::format_for_path(&request.input).ok_or_else(|| {
                anyhow!(
                    "Cannot infer graph format of {}, pass --format",
                    request.input.display()
                )
            })?,
        };
        let source = fs::read_to_string(&request.input)
            .with_context(|| format!("Failed to read {}", request.input.display()))?;

        let collection = self
            .registry
            .parse(&format, &source)
            .with_context(|| format!("Failed to import {}", request.input.display()))?;
        log::info!(
            "Imported {} nodes ({} links) from {}",
            collection.len(),
            collection.resolve_links().len(),
            request.input.display()
        );

        let document = self.render(&collection.to_record())?;
        match request.output {
            Some(path) => {
                fs::write(&path, document + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {}", path.display());
                Ok(())
            }
            None => print_stdout(&document),
        }
    }

    pub fn links(&self, document: &Path, by_index: bool) -> Result<()> {
        let collection = load_collection(document)?;
        let output = if by_index {
            serde_json::to_value(collection.resolve_index_links())?
        } else {
            let links: Vec<Value> = collection
                .resolve_links()
                .into_iter()
                .map(|link| {
                    json!({
                        "root": collection[link.root].uuid,
                        "root_slot": link.root_slot,
                        "leaf": collection[link.leaf].uuid,
                        "leaf_slot": link.leaf_slot,
                    })
                })
                .collect();
            Value::Array(links)
        };
        print_stdout(&self.render(&output)?)
    }

    pub fn tree(&self, document: &Path) -> Result<()> {
        let collection = load_collection(document)?;
        let (trees, orphans) = collection.resolve_tree();
        let names = |ids: &[NodeId]| -> Vec<String> {
            ids.iter()
                .map(|&id| collection[id].snippet.name.clone())
                .collect()
        };

        let trees: Vec<Vec<Vec<String>>> = trees
            .iter()
            .map(|layers| layers.iter().map(|layer| names(layer.as_slice())).collect())
            .collect();
        let output = json!({ "trees": trees, "orphans": names(orphans.as_slice()) });
        print_stdout(&self.render(&output)?)
    }

    pub fn check(&self, document: &Path) -> Result<()> {
        let collection = load_collection(document)?;
        let (trees, orphans) = collection.resolve_tree();
        let output = json!({
            "nodes": collection.len(),
            "links": collection.resolve_links().len(),
            "trees": trees.len(),
            "orphans": orphans.len(),
        });
        log::info!("{} is a valid collection", document.display());
        print_stdout(&self.render(&output)?)
    }

    fn render(&self, value: &impl Serialize) -> Result<String> {
        let text = if self.config.export.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

/// Read and fully validate a collection document
pub fn load_collection(path: &Path) -> Result<NodeCollection> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    NodeCollection::from_json(&text)
        .with_context(|| format!("Invalid collection document {}", path.display()))
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
