// src/main.rs
mod api;
mod extractors;
mod market;
mod runner;
mod storage;
mod utils;

use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use api::{ApiState, DEFAULT_DAILY_LIMIT};
use market::{HttpSource, AUCTION_PAGE_URL};
use runner::Runner;
use storage::{AuctionStore, SqliteStore};
use utils::AppError;

/// Scraper and REST service for French power auction results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite database file (or a full sqlite: URL)
    #[arg(long, env = "DB_PATH", default_value = "energy_auctions.db", global = true)]
    db_path: String,

    /// Page carrying the auction results
    #[arg(long, env = "AUCTION_URL", default_value = AUCTION_PAGE_URL, global = true)]
    url: String,

    /// Timeout for fetching the page, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Debug mode - save raw and annotated pages for every run
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output directory for debug dumps
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3001)]
        port: u16,

        /// Extraction triggers allowed per UTC day
        #[arg(long, env = "DAILY_LIMIT", default_value_t = DEFAULT_DAILY_LIMIT)]
        daily_limit: u32,
    },
    /// Run one extraction and store the results
    Extract,
    /// Print statistics over the stored records
    Stats,
}

fn database_url(db_path: &str) -> String {
    if db_path.starts_with("sqlite:") {
        db_path.to_string()
    } else {
        format!("sqlite:{}", db_path)
    }
}

fn build_runner(args: &Args, store: Arc<dyn AuctionStore>) -> Result<Runner, AppError> {
    let source = HttpSource::new(Duration::from_secs(args.timeout_secs))?;
    let runner = Runner::new(Arc::new(source), store, args.url.clone());
    if args.debug {
        let debug_dir = Path::new(&args.output_dir).join("debug");
        tracing::info!("Debug dumps enabled in {}", debug_dir.display());
        return Ok(runner.with_debug_dir(debug_dir));
    }
    Ok(runner)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(if args.debug { "debug" } else { "info" });
    tracing::info!("Starting with args: {:?}", args);

    // 3. Initialize storage
    let store = Arc::new(SqliteStore::connect(&database_url(&args.db_path)).await?);
    tracing::info!("Database ready at {}", args.db_path);

    match &args.command {
        Command::Serve { port, daily_limit } => {
            let runner = build_runner(&args, store.clone())?;
            let state = ApiState {
                store: store.clone(),
                usage: store,
                runner: Arc::new(runner),
                daily_limit: *daily_limit,
            };

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", *port)).await?;
            tracing::info!("Server running on port {}", port);
            tracing::info!("API available at: http://localhost:{}/api", port);
            axum::serve(listener, api::router(state)).await?;
        }
        Command::Extract => {
            let runner = build_runner(&args, store)?;
            let stored = runner.run().await?;
            tracing::info!("Successfully scraped and stored {} auction records", stored.len());
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Command::Stats => {
            let stats = store.aggregate().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_accepts_paths_and_urls() {
        assert_eq!(database_url("energy_auctions.db"), "sqlite:energy_auctions.db");
        assert_eq!(database_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["auction_scraper", "serve"]).unwrap();
        assert_eq!(args.url, AUCTION_PAGE_URL);
        assert_eq!(args.timeout_secs, 30);
        assert!(!args.debug);
        match args.command {
            Command::Serve { daily_limit, .. } => assert_eq!(daily_limit, DEFAULT_DAILY_LIMIT),
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["auction_scraper", "extract", "--debug", "--timeout-secs", "5"]).unwrap();
        assert!(matches!(args.command, Command::Extract));
        assert!(args.debug);
        assert_eq!(args.timeout_secs, 5);
    }
}
