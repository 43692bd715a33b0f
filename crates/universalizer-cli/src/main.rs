//! Universalizer CLI
//!
//! `universalizer run <GRAPH_DIR>` normalizes the node and edge tables of one
//! KGX graph directory in place and writes diagnostic side files next to them.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use universalizer_core::{NormalizeConfig, RunReport};

const DEFAULT_LOG_FILTER: &str = "universalizer=info";

#[derive(Parser)]
#[command(name = "universalizer")]
#[command(
    author,
    version,
    about = "Normalize node identifiers and categories in KGX graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a graph directory holding one `*nodes.tsv` and one `*edges.tsv`.
    ///
    /// Both tables are rewritten together or not at all.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing the node and edge tables
    graph_dir: PathBuf,

    /// SSSOM mapping file, or a directory of them (not recursive). Repeatable.
    #[arg(short = 'm', long = "map-path")]
    map_paths: Vec<PathBuf>,

    /// Two-column `prefix<TAB>category` file
    #[arg(long)]
    namespace_map: Option<PathBuf>,

    /// Prefix contexts in override order (built-in names or JSON files)
    #[arg(long, value_delimiter = ',')]
    contexts: Vec<String>,

    /// Also resolve and rewrite node categories
    #[arg(short = 'u', long)]
    update_categories: bool,

    /// Directory of `<prefix>.tsv` category files to consult as an oracle
    #[arg(long)]
    oracle_dir: Option<PathBuf>,

    /// JSON config; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not write the unexpected-id/category and remap side files
    #[arg(long)]
    no_diagnostics: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn to_config(&self) -> Result<NormalizeConfig> {
        let mut config = match &self.config {
            Some(path) => NormalizeConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => NormalizeConfig::default(),
        };
        if !self.contexts.is_empty() {
            config.contexts = self.contexts.clone();
        }
        if !self.map_paths.is_empty() {
            config.map_paths = self.map_paths.clone();
        }
        if self.namespace_map.is_some() {
            config.namespace_map = self.namespace_map.clone();
        }
        if self.oracle_dir.is_some() {
            config.oracle_dir = self.oracle_dir.clone();
        }
        if self.update_categories {
            config.update_categories = true;
        }
        if self.no_diagnostics {
            config.write_diagnostics = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = args.to_config()?;
    tracing::debug!(?config, "effective config");

    eprintln!("{} {}", "Normalizing".green().bold(), args.graph_dir.display());
    if config.update_categories {
        eprintln!("  will update categories");
    }
    if !config.map_paths.is_empty() {
        eprintln!("  using {} mapping path(s)", config.map_paths.len());
    }

    let report = universalizer_core::run(&args.graph_dir, &config)
        .with_context(|| format!("failed to normalize {}", args.graph_dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    print_summary(&args.graph_dir, &report);
    Ok(())
}

fn print_summary(graph_dir: &Path, report: &RunReport) {
    eprintln!(
        "{} normalized {} (ids remapped={} nodes updated={} categories updated={} edges removed={})",
        "ok".green().bold(),
        graph_dir.display(),
        report.ids_remapped,
        report.rewrite.nodes_updated,
        report.rewrite.categories_updated,
        report.rewrite.edges_removed,
    );
    let unexpected = report.identifier_anomalies + report.category_anomalies;
    if unexpected > 0 {
        eprintln!(
            "{} {} unexpected identifiers, {} unexpected categories (see side files)",
            "note".yellow().bold(),
            report.identifier_anomalies,
            report.category_anomalies,
        );
    }
    if report.rewrite.malformed_rows > 0 {
        eprintln!(
            "{} {} malformed rows passed through unchanged",
            "warning".yellow().bold(),
            report.rewrite.malformed_rows
        );
    }
}
