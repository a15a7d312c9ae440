//! Brand-Watcher main entry point
//!
//! This is the command-line interface for the Brand-Watcher listing monitor.
//! Each invocation performs a single run; schedule it with cron or similar.

use anyhow::{bail, Context};
use brand_watcher::config::load_config_with_env;
use brand_watcher::run_watch;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Brand-Watcher: new-arrival alerts for a brand listing
///
/// Brand-Watcher crawls a retailer's paginated brand listing, compares the
/// products against those seen on earlier runs and emails a summary of any
/// new arrivals.
#[derive(Parser, Debug)]
#[command(name = "brand-watcher")]
#[command(version = "1.0.0")]
#[command(about = "New-arrival alerts for a brand listing", long_about = None)]
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

    /// Crawl and diff, print the notification, but neither send nor save
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config_with_env(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let summary = run_watch(config, cli.dry_run)
        .await
        .context("Watch run failed")?;

    if cli.dry_run {
        println!("=== Brand-Watcher Dry Run ===\n");
        println!(
            "Pages fetched: {} ({})",
            summary.pages_fetched, summary.stop_reason
        );
        println!("Products found: {}", summary.products_found);
        println!("\nSubject: {}\n", summary.notification.subject);
        println!("{}\n", summary.notification.text_body);
    }

    println!("{}", summary);

    if summary.delivery_failed() {
        bail!("Notification delivery failed");
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
            0 => EnvFilter::new("brand_watcher=info,warn"),
            1 => EnvFilter::new("brand_watcher=debug,info"),
            2 => EnvFilter::new("brand_watcher=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
