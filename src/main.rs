//! llmstxt-harvest command-line harness
//!
//! Crawls one site from a seed URL and prints the LLMs.txt rendering or the
//! JSON report to stdout, with crawl statistics on stderr.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use llmstxt_harvest::config::{load_config_with_hash, load_reference_dataset, Config};
use llmstxt_harvest::output::{format_statistics, render_report};
use llmstxt_harvest::{crawl_with_cancellation, SchemaType};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// llmstxt-harvest: a polite single-site content harvester
///
/// Crawls a website breadth-first from the seed URL, staying on the seed's
/// host, respecting robots.txt, and turning every HTML page into structured
/// sections. Optionally derives a pharma-product or clinical-trial record.
#[derive(Parser, Debug)]
#[command(name = "llmstxt-harvest")]
#[command(version)]
#[command(about = "A polite single-site content harvester", long_about = None)]
struct Cli {
    /// Seed URL (https:// is assumed when the scheme is omitted)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum link distance from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of URLs to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Schema to derive: none, pharma-product or clinical-trial
    #[arg(long, value_name = "TYPE")]
    schema: Option<SchemaType>,

    /// TOML reference table of known products
    #[arg(long, value_name = "PATH")]
    reference: Option<PathBuf>,

    /// Do not consult robots.txt
    #[arg(long)]
    ignore_robots: bool,

    /// Stop the crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Llms)]
    format: OutputFormat,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// LLMs.txt markdown
    Llms,
    /// Full JSON report
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let reference_path = cli
        .reference
        .clone()
        .or_else(|| config.schema.reference_dataset.as_ref().map(PathBuf::from));
    let reference = match reference_path {
        Some(path) => Some(load_reference(&path)?),
        None => None,
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping crawl");
                cancel.cancel();
            }
        });
    }

    let report = crawl_with_cancellation(&cli.url, config, reference, cancel)
        .await
        .with_context(|| format!("Crawl of {} failed", cli.url))?;

    match cli.format {
        OutputFormat::Llms => print!("{}", render_report(&report)),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if !cli.quiet {
        eprintln!("{}", format_statistics(&report.stats));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("llmstxt_harvest=info,warn"),
            1 => EnvFilter::new("llmstxt_harvest=debug,info"),
            2 => EnvFilter::new("llmstxt_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(schema) = cli.schema {
        config.schema.schema_type = schema;
    }
    if cli.ignore_robots {
        config.crawler.respect_robots = false;
    }
    if let Some(secs) = cli.deadline_secs {
        config.crawler.deadline_ms = Some(secs.saturating_mul(1000));
    }
}

fn load_reference(path: &Path) -> anyhow::Result<llmstxt_harvest::ReferenceDataset> {
    let reference = load_reference_dataset(path)
        .with_context(|| format!("Failed to load reference dataset from {}", path.display()))?;
    tracing::info!(
        "Loaded {} reference products from {}",
        reference.len(),
        path.display()
    );
    Ok(reference)
}
