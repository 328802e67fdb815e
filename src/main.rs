//! MacShop-Harvest main entry point
//!
//! This is the command-line interface for the MacShop-Harvest board harvester.

use anyhow::Context;
use clap::Parser;
use macshop_harvest::config::{load_config_or_default, validate, Config};
use macshop_harvest::crawler::harvest;
use macshop_harvest::output::{
    load_snapshot, persist_if_safe, print_breakdown, CategoryBreakdown, JsonSnapshotWriter,
    PersistOutcome,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// MacShop-Harvest: a polite board harvester
///
/// Walks the newest pages of the MacShop board, keeps for-sale posts for
/// Apple products, resolves their prices, and writes a JSON snapshot.
#[derive(Parser, Debug)]
#[command(name = "macshop-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite board harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (reference defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of listing pages to walk (overrides the config)
    #[arg(short, long)]
    pages: Option<u32>,

    /// Snapshot file to write (overrides the config)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "show")]
    dry_run: bool,

    /// Show statistics for the existing snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    show: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.show {
        handle_show(&config)?;
    } else {
        handle_harvest(&config).await?;
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
            0 => EnvFilter::new("macshop_harvest=info,warn"),
            1 => EnvFilter::new("macshop_harvest=debug,info"),
            2 => EnvFilter::new("macshop_harvest=trace,debug"),
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

/// Loads the config file (or defaults) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(pages) = cli.pages {
        config.crawler.page_budget = pages;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }

    validate(&config).context("invalid command-line override")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== MacShop-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Board: {}", config.crawler.board_url);
    println!("  Page budget: {}", config.crawler.page_budget);
    println!("  Resolve details: {}", config.crawler.resolve_details);
    println!(
        "  Plausibility threshold: {}",
        config.crawler.plausibility_threshold
    );
    println!(
        "  Challenge phrases: {}",
        config.crawler.challenge_phrases.join(", ")
    );

    println!("\nClient:");
    println!("  Max attempts: {}", config.client.max_attempts);
    println!("  Backoff base: {}ms", config.client.backoff_base_ms);
    println!("  Timeout: {}s", config.client.timeout_secs);
    println!("  User agents: {}", config.client.user_agents.len());

    println!("\nRate:");
    println!(
        "  Page delay: {:.1}s - {:.1}s",
        config.rate.page_delay_min_secs, config.rate.page_delay_max_secs
    );
    println!(
        "  Detail delay: {:.1}s - {:.1}s",
        config.rate.detail_delay_min_secs, config.rate.detail_delay_max_secs
    );

    println!("\nTaxonomy:");
    for row in &config.taxonomy.categories {
        println!("  - {}: {}", row.category, row.aliases.join(", "));
    }
    println!("  Regions: {}", config.taxonomy.regions.join(" "));

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --show mode: prints statistics for the existing snapshot
fn handle_show(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.output.path);
    let snapshot = load_snapshot(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    println!("Snapshot: {}", path.display());
    println!("Updated at: {}\n", snapshot.updated_at);
    print_breakdown(&CategoryBreakdown::from_records(&snapshot.data));

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting up to {} pages from {}",
        config.crawler.page_budget,
        config.crawler.board_url
    );

    let report = harvest(config).await.context("harvest failed")?;

    if report.termination.is_blocked() {
        tracing::warn!("Blocked by an anti-bot challenge page");
    }
    if report.candidates_skipped > 0 {
        tracing::warn!("{} entries could not be read", report.candidates_skipped);
    }

    let breakdown = CategoryBreakdown::from_records(report.result.records());

    let mut writer = JsonSnapshotWriter::new(&config.output.path);
    match persist_if_safe(report.result, &mut writer).context("failed to write snapshot")? {
        PersistOutcome::Written(records) => {
            print_breakdown(&breakdown);
            println!(
                "Done! Harvested {} listings. Saved to {}.",
                records,
                writer.path().display()
            );
        }
        PersistOutcome::Skipped => {
            println!(
                "Found 0 listings; kept the previous snapshot at {}.",
                writer.path().display()
            );
        }
    }

    Ok(())
}
