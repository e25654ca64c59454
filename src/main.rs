//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the Shelf-Harvest product harvester.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shelf_harvest::config::{load_config_with_hash, Config};
use shelf_harvest::output::{
    generate_markdown_report, print_products, print_search_report, print_statistics,
    CollectionStatistics,
};
use shelf_harvest::scraper::{spawn_search, ScraperSession, SearchStatus};
use shelf_harvest::storage::{collection_to_csv_string, CollectionStores};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a polite product listing harvester
///
/// Shelf-Harvest searches a retail site for a term, harvests every matching
/// product's details and reviews while respecting robots.txt and adapting
/// its request rate, and stores the results as CSV and JSON collections.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite product listing harvester", long_about = None)]
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

    /// Validate config and show the effective settings without scraping
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a term and harvest the matching products
    Search {
        /// Search term; also the name of the resulting collection
        term: String,

        /// Cancel the search after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Print the results without saving the collection
        #[arg(long)]
        no_save: bool,

        /// Also write a markdown report of the search
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// List stored collections
    List,

    /// Show a stored collection
    Show {
        name: String,

        /// List every product, not only the statistics
        #[arg(long)]
        products: bool,
    },

    /// Print a stored collection as CSV
    Export {
        name: String,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete a stored collection from both folders
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let Some(command) = cli.command else {
        bail!("no command given; run with --help to see the available commands");
    };

    match command {
        Command::Search {
            term,
            timeout_secs,
            no_save,
            report,
        } => handle_search(config, term, timeout_secs, no_save, report).await,
        Command::List => handle_list(&config),
        Command::Show { name, products } => handle_show(&config, &name, products),
        Command::Export { name, output } => handle_export(&config, &name, output),
        Command::Delete { name } => handle_delete(&config, &name),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
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
    println!("=== Shelf-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nScraper:");
    println!(
        "  Max concurrent requests: {}",
        config.scraper.max_concurrent_requests
    );
    println!("  Max products: {}", config.scraper.max_products);
    println!("  Max reviews per product: {}", config.scraper.max_reviews);
    println!("  Search page cap: {}", config.scraper.page_cap);
    println!("  Review page size: {}", config.scraper.review_page_size);
    println!("  Request timeout: {}s", config.scraper.request_timeout_secs);

    println!("\nRate Limit:");
    println!("  Initial rate: {} req/s", config.rate_limit.initial_rate);
    println!("  Max rate: {} req/s", config.rate_limit.max_rate);
    println!(
        "  Jitter: {}-{}ms",
        config.rate_limit.min_jitter_ms, config.rate_limit.max_jitter_ms
    );

    println!("\nRetry:");
    println!("  Attempts: {}", config.retry.attempts);
    println!(
        "  Backoff: {}ms base, {}s cap, up to {}ms jitter",
        config.retry.base_backoff_ms, config.retry.max_backoff_secs, config.retry.backoff_jitter_ms
    );

    println!("\nOutput:");
    println!("  CSV folder: {}", config.output.csv_dir);
    println!("  JSON folder: {}", config.output.json_dir);

    println!("\nUser Agents ({}):", config.user_agent.pool.len());
    for agent in &config.user_agent.pool {
        println!("  - {}", agent);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the search command
async fn handle_search(
    config: Config,
    term: String,
    timeout_secs: Option<u64>,
    no_save: bool,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let stores = CollectionStores::open(&config.output);
    let session = Arc::new(ScraperSession::new(config)?);

    let report = match timeout_secs {
        None => session.search(&term).await,
        Some(secs) => {
            // Bounded run: the background task is cancelled on timeout
            let handle = spawn_search(Arc::clone(&session), term.clone());
            match handle.wait_timeout(Duration::from_secs(secs)).await {
                SearchStatus::Completed(report) | SearchStatus::NoResults(report) => *report,
                SearchStatus::Cancelled => bail!("search for '{}' timed out after {}s", term, secs),
                SearchStatus::Failed(reason) => bail!("search for '{}' failed: {}", term, reason),
                SearchStatus::Running => bail!("search for '{}' did not settle", term),
            }
        }
    };

    print_search_report(&report);

    if let Some(path) = &report_path {
        generate_markdown_report(&report, path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("✓ Report written to: {}", path.display());
    }

    if let Some(collection) = &report.collection {
        println!();
        print_statistics(&CollectionStatistics::from_collection(collection));
        save_collection(&stores, collection, no_save)?;
    }

    Ok(())
}

fn save_collection(
    stores: &CollectionStores,
    collection: &shelf_harvest::Collection,
    no_save: bool,
) -> anyhow::Result<()> {
    if no_save {
        tracing::info!("--no-save given; collection not written");
        return Ok(());
    }

    let (csv, json) = stores.save(collection)?;
    println!("\n✓ Saved to: {}", csv.display());
    println!("✓ Saved to: {}", json.display());
    Ok(())
}

/// Handles the list command
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let stores = CollectionStores::open(&config.output);
    let names = stores.list_names()?;

    if names.is_empty() {
        println!("No stored collections");
        return Ok(());
    }

    println!("Stored collections ({}):", names.len());
    for name in names {
        match stores.load(&name) {
            Ok(collection) => println!("  - {} ({} products)", name, collection.len()),
            Err(e) => println!("  - {} (unreadable: {})", name, e),
        }
    }
    Ok(())
}

/// Handles the show command
fn handle_show(config: &Config, name: &str, products: bool) -> anyhow::Result<()> {
    let stores = CollectionStores::open(&config.output);
    let collection = stores
        .load(name)
        .with_context(|| format!("failed to load collection '{}'", name))?;

    print_statistics(&CollectionStatistics::from_collection(&collection));
    if products {
        println!();
        print_products(&collection);
    }
    Ok(())
}

/// Handles the export command
fn handle_export(config: &Config, name: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let stores = CollectionStores::open(&config.output);
    let collection = stores
        .load(name)
        .with_context(|| format!("failed to load collection '{}'", name))?;
    let csv = collection_to_csv_string(&collection)?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Exported to: {}", path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

/// Handles the delete command
fn handle_delete(config: &Config, name: &str) -> anyhow::Result<()> {
    let stores = CollectionStores::open(&config.output);
    if stores.delete(name)? {
        println!("✓ Deleted collection '{}'", name);
    } else {
        println!("No collection named '{}'", name);
    }
    Ok(())
}
