#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the regional metrics service.
//!
//! Prints the per-country furniture waste CO₂ ranking, the totals and
//! highlighted-country panel, or manages the on-disk cache. Logging is
//! controlled with `RUST_LOG` (e.g., `RUST_LOG=info eraswap metrics`).

mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eraswap_metrics::MetricsConfig;

/// Regional furniture waste CO₂ metrics from Eurostat data.
#[derive(Parser)]
#[command(name = "eraswap")]
#[command(about = "Regional furniture waste CO2 metrics from Eurostat data")]
struct Cli {
    /// Directory holding the metrics cache (default: `data/` in the
    /// workspace root).
    #[arg(long, env = "ERASWAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Alternate metrics config file (default: the embedded config).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the per-country ranking.
    Metrics {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print totals and the highlighted country.
    Summary {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show where the cache lives and whether it is fresh.
    CacheStatus,

    /// Delete cached metrics so the next run fetches live data.
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MetricsConfig::from_file(path)?,
        None => MetricsConfig::embedded()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(eraswap_cache::paths::data_dir);
    log::debug!("Using data dir {}", data_dir.display());

    let service = eraswap_metrics::production_service(config, &data_dir)?;

    match cli.command {
        Commands::Metrics { json } => {
            let report = service.get_report().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_report(&report);
            }
        }
        Commands::Summary { json } => {
            let report = service.get_report().await;
            let summary = service.summarize(&report.entities);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output::print_summary(report.provenance, &summary);
            }
        }
        Commands::CacheStatus => {
            output::print_cache_status(
                &eraswap_cache::paths::cache_dir(&data_dir),
                service.cache_written_at(),
                service.is_cache_fresh(),
            );
        }
        Commands::ClearCache => {
            service.clear_cache();
            println!("Cache cleared.");
        }
    }

    Ok(())
}
