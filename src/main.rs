//! Catalog Trawler main entry point
//!
//! This is the command-line interface for the Catalog Trawler listing harvester.

use anyhow::Context;
use catalog_trawler::config::{load_config_with_hash, Config};
use catalog_trawler::output::print_statistics;
use catalog_trawler::run_crawl;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog Trawler: a resilient listing harvester
///
/// Catalog Trawler discovers the categories of a catalog site, walks each
/// category's listing pages and writes the extracted records to JSON and/or
/// SQLite. Press Ctrl-C to stop early; records gathered so far are kept.
#[derive(Parser, Debug)]
#[command(name = "catalog-trawler")]
#[command(version = "1.0.0")]
#[command(about = "A resilient catalog listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Crawl at most this many categories
    #[arg(long, value_name = "N")]
    max_brands: Option<usize>,

    /// Fetch at most this many listing pages per category
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_brands) = cli.max_brands {
        anyhow::ensure!(max_brands >= 1, "--max-brands must be >= 1");
        config.crawler.max_brands = Some(max_brands);
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_trawler=info,warn"),
            1 => EnvFilter::new("catalog_trawler=debug,info"),
            2 => EnvFilter::new("catalog_trawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Catalog Trawler Dry Run ===\n");

    println!("Site:");
    println!("  Name: {}", config.site.display_name());
    println!("  Base URL: {}", config.site.base_url);
    println!("  Seed template: {}", config.site.seed_template);

    println!("\nDiscovery:");
    println!("  API endpoints ({}):", config.site.api_endpoints.len());
    for endpoint in &config.site.api_endpoints {
        println!("    * {}", endpoint);
    }
    println!("  Listing roots ({}):", config.site.listing_roots.len());
    for root in &config.site.listing_roots {
        println!("    * {}", root);
    }
    println!(
        "  Fallback categories: {}",
        config.site.fallback_categories.join(", ")
    );

    println!("\nCrawler:");
    match config.crawler.max_brands {
        Some(n) => println!("  Max brands: {}", n),
        None => println!("  Max brands: unlimited"),
    }
    println!("  Max pages per brand: {}", config.crawler.max_pages);
    println!(
        "  Attempts per fetch: {} (alternate transport: {})",
        config.fetcher.attempts_per_fetch,
        if config.fetcher.escalate_to_alt { "yes" } else { "no" }
    );
    println!(
        "  Page delay: {}-{}ms",
        config.pacing.page_delay_min_ms, config.pacing.page_delay_max_ms
    );
    println!(
        "  Category delay: {}-{}ms",
        config.pacing.category_delay_min_ms, config.pacing.category_delay_max_ms
    );
    if let Some(budget) = config.crawler.run_budget_secs {
        println!("  Run budget: {}s", budget);
    }

    println!("\nSelectors:");
    println!("  Listing: {}", config.selectors.listing.join(" | "));
    println!("  Field overrides: {}", config.selectors.fields.len());
    println!("  Identities: {}", config.identities.len());

    println!("\nOutput:");
    if let Some(path) = &config.output.json_path {
        println!("  JSON: {}", path);
    }
    if let Some(path) = &config.output.database_path {
        println!("  Database: {}", path);
    }
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // Ctrl-C stops the crawl; records gathered so far are still written
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing with records gathered so far");
            ctrl_c_token.cancel();
        }
    });

    if let Some(budget) = config.crawler.run_budget_secs {
        let budget_token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(budget)) => {
                    tracing::warn!("Run budget of {}s exhausted, stopping crawl", budget);
                    budget_token.cancel();
                }
                _ = budget_token.cancelled() => {}
            }
        });
    }

    tracing::info!("Starting trawl of {}", config.site.display_name());

    let report = run_crawl(&config, config_hash, cancel.clone())
        .await
        .context("Crawl failed")?;

    // Release the background timers
    cancel.cancel();

    if report.cancelled {
        tracing::info!("Crawl stopped early with {} records", report.records.len());
    } else {
        tracing::info!("Crawl completed with {} records", report.records.len());
    }

    print_statistics(&report);

    Ok(())
}
