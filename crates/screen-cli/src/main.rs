//! CLI binary for the screen spec index: collect, query, and inspect.

mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use progress::CollectProgress;
use screen_core::config::ScreenConfig;
use screen_nav::format::format_stats;
use screen_nav::interpret::canonical_project;
use screen_resolve::{CollectOptions, Collector, QueryRequest, Resolver, extract_options};
use screen_tree::{HttpDocumentProvider, TreeClient};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "screen-spec", about = "Design screen spec index and lookup")]
struct Cli {
    /// Root directory holding `.screen/config.toml` and `data/` (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every configured project's design files and rebuild the index
    Collect {
        /// Projects to collect (repeatable; defaults to the configured list)
        #[arg(short, long = "project")]
        projects: Vec<String>,

        /// Let a version that came back empty replace its previous screens
        #[arg(long)]
        allow_empty_overwrite: bool,
    },

    /// Look a screen up by id or keywords
    Query {
        /// Screen id, keywords, or a number answering the previous list
        query: String,

        /// Project name or alias
        #[arg(short, long)]
        project: Option<String>,

        /// Release version (X.Y.Z)
        #[arg(short, long)]
        version: Option<String>,

        /// Always list candidates, even for a single match
        #[arg(long)]
        no_auto_confirm: bool,
    },

    /// Show index statistics
    Stats,
}

fn get_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn load_config(root: &Path) -> Result<ScreenConfig> {
    ScreenConfig::load(root)
        .with_context(|| format!("failed to load config under {}", root.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = get_root(&cli)?;

    match cli.command {
        Commands::Collect {
            projects,
            allow_empty_overwrite,
        } => cmd_collect(&root, &projects, allow_empty_overwrite),
        Commands::Query {
            query,
            project,
            version,
            no_auto_confirm,
        } => cmd_query(&root, query, project, version, !no_auto_confirm),
        Commands::Stats => cmd_stats(&root),
    }
}

fn cmd_collect(root: &Path, projects: &[String], allow_empty_overwrite: bool) -> Result<()> {
    let config = load_config(root)?;
    if config.remote.token.is_empty() {
        anyhow::bail!(
            "FIGMA_TOKEN is not set. Export it or add remote.token to .screen/config.toml."
        );
    }

    let mut options = CollectOptions::from(&config.collection);
    if !projects.is_empty() {
        options.projects = projects
            .iter()
            .map(|p| canonical_project(p, &config.aliases))
            .collect();
    }
    options.allow_empty_overwrite |= allow_empty_overwrite;

    let index_path = config.index_path(root);
    let client = TreeClient::new(HttpDocumentProvider::new(&config.remote));
    let extract = extract_options(&config);

    eprintln!(
        "Collecting {} into {}",
        options.projects.join(", "),
        index_path.display()
    );
    let mut progress = CollectProgress::new();
    let report = Collector::new(&client, &options, &extract)
        .run(&index_path, &mut |event| progress.handle(event));
    progress.finish();
    let report = report?;

    if !report.saved {
        anyhow::bail!(
            "no project could be collected ({}); index left unchanged",
            report.failed_projects.join(", ")
        );
    }
    println!("Collected: {}", report.collected_projects.join(", "));
    if !report.failed_projects.is_empty() {
        println!("Failed: {}", report.failed_projects.join(", "));
    }
    println!(
        "Versions updated: {}, kept from previous index: {}",
        report.merge.updated_versions, report.merge.preserved_versions
    );
    println!("Total screens: {}", report.total_screens);
    if let Some(backup) = &report.backup {
        println!("Previous index saved as {}", backup.display());
    }
    Ok(())
}

fn cmd_query(
    root: &Path,
    query: String,
    project: Option<String>,
    version: Option<String>,
    auto_confirm: bool,
) -> Result<()> {
    let config = load_config(root)?;
    let index_path = config.index_path(root);
    let provider = HttpDocumentProvider::new(&config.remote);
    let mut resolver = Resolver::new(config, index_path, provider);

    let request = QueryRequest {
        query,
        project,
        version,
        auto_confirm,
        session: None,
    };
    let outcome = resolver.query(&request)?;
    println!("{}", outcome.render());
    Ok(())
}

fn cmd_stats(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    let index_path = config.index_path(root);
    let provider = HttpDocumentProvider::new(&config.remote);
    let mut resolver = Resolver::new(config, index_path, provider);

    let stats = resolver.stats()?;
    println!("{}", format_stats(&stats));
    Ok(())
}
