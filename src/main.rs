//! Bookrank main entry point
//!
//! This is the command-line interface for ranking the books of a catalog tag.

use bookrank::config::{load_config_with_hash, validate, Config};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bookrank: ranks the books listed under a catalog tag
///
/// Bookrank fetches every listing page of the tag, scores each book with a
/// popularity-adjusted rating and writes the ranked list as Markdown.
#[derive(Parser, Debug)]
#[command(name = "bookrank")]
#[command(version)]
#[command(about = "Ranks the books listed under a catalog tag", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Catalog tag to rank
    #[arg(short, long)]
    tag: Option<String>,

    /// Maximum number of page fetches in flight
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Capacity of the buffer between fetch and parse workers
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// Report destination (default: <TAG>.md)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(tag) = &self.tag {
            config.catalog.tag = tag.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.pipeline.concurrency = concurrency;
        }
        if let Some(capacity) = self.buffer_capacity {
            config.pipeline.buffer_capacity = capacity;
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match bookrank::run(config).await {
        Ok(summary) => {
            println!(
                "Collected {} books for '{}' in {:.2?}, report written to {}",
                summary.total_books,
                summary.tag,
                summary.elapsed,
                summary.report_path.display()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookrank=info,warn"),
            1 => EnvFilter::new("bookrank=debug,info"),
            2 => EnvFilter::new("bookrank=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Bookrank Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Tag: {}", config.catalog.tag);
    println!("  User agent: {}", config.catalog.user_agent);
    println!("  Listing URL: {}", config.listing_url());

    println!("\nPipeline:");
    println!("  Concurrency: {}", config.pipeline.concurrency);
    println!("  Buffer capacity: {}", config.pipeline.buffer_capacity);
    println!("  Dispatch stagger: {}ms", config.pipeline.stagger_ms);
    println!(
        "  Request timeout: {}s",
        config.pipeline.request_timeout_secs
    );
    println!("  Retries: {}", config.pipeline.retries);

    println!("\nOutput:");
    println!("  Report: {}", config.output_path().display());

    println!("\n✓ Configuration is valid");
}
