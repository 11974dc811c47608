//! # Blog Harvester
//!
//! Captures newly published articles from a blog aggregator's front pages and
//! stores each one exactly once as a JSON envelope under a month-partitioned,
//! content-addressed layout.
//!
//! ## Usage
//!
//! ```sh
//! MAX_PAGES_FROM_HOME=2 SLEEP_SEC=1.0 blog_harvester -o ./archive
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Indexing**: Collect candidate article URLs from the listing pages
//! 2. **Dedup**: Skip URLs whose identity already exists in this month's partition
//! 3. **Extraction**: Fetch each remaining article and build its record
//! 4. **Output**: Write one envelope per article and the run-result file
//!
//! Articles are processed strictly one after another with a pause between
//! fetches. A failing article is logged and skipped; it never ends the run.

use std::error::Error;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod http;
mod identity;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use http::Session;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env first so RUST_LOG from it reaches the filter
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("blog_harvester starting up");

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let config = args.into_config()?;

    // Early check: ensure the output root is writable
    if let Err(e) = ensure_writable_dir(&config.output_root).await {
        error!(
            path = %config.output_root.display(),
            error = %e,
            "Output root is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let session = Session::new()?;
    let started_at = Utc::now();
    let summary = pipeline::run(&config, &session, started_at).await?;

    let elapsed = start_time.elapsed();
    info!(
        new_files = summary.new_files,
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
