use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{ImportRequest, Runner};
use config::CliConfig;
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "codememo")]
#[command(about = "Annotated reference graphs over code snippets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (overrides CODEMEMO_CONFIG and ~/.codememo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a call graph (e.g. a .dot file) into a collection document
    Import(ImportArgs),

    /// Print the resolved parent -> child links of a document
    Links(LinksArgs),

    /// Print the breadth-first layers of every tree and the orphans
    Tree(DocumentArgs),

    /// Validate a document by replaying all of its links
    Check(DocumentArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Call graph file
    input: PathBuf,

    /// Graph format (defaults to the file extension)
    #[arg(long)]
    format: Option<String>,

    /// Output document (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct LinksArgs {
    /// Collection document (JSON)
    document: PathBuf,

    /// Report nodes by position instead of uuid
    #[arg(long)]
    index: bool,
}

#[derive(Args)]
struct DocumentArgs {
    /// Collection document (JSON)
    document: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let (config, config_path) = CliConfig::load(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        log::debug!("Loaded config from {}", path.display());
    }
    let runner = Runner::new(config)?;

    match cli.command {
        Commands::Import(args) => runner.import(ImportRequest {
            input: args.input,
            format: args.format,
            output: args.output,
        })?,
        Commands::Links(args) => runner.links(&args.document, args.index)?,
        Commands::Tree(args) => runner.tree(&args.document)?,
        Commands::Check(args) => runner.check(&args.document)?,
    }

    Ok(())
}
