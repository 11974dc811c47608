//! Run orchestration.
//!
//! One run: discover candidates, then for each URL in order compute its
//! identity, skip it if the run's partition already holds it, otherwise
//! extract and persist it. Per-URL failures are logged and never stop the
//! run. The run start instant is captured once by the caller and used for
//! both the partition and every envelope's `created_at_utc`.
//!
//! Execution is strictly sequential. The presence check followed by the
//! write is not atomic, so a parallel variant would need to guard it.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::error::CrawlError;
use crate::http::Session;
use crate::identity::{Partition, file_name, identity_of, should_process};
use crate::models::{Envelope, ExtractionRecord, RunSummary};
use crate::outputs::json::{persist_envelope, write_run_summary};
use crate::scrapers::listing::{ListingSite, discover};
use crate::scrapers::{article, listing};
use crate::utils::utc_stamp;

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Directory holding `by_created/` and `.action_result.json`.
    pub output_root: PathBuf,
    pub site_url: String,
    pub listing_selector: String,
    /// Listing pages to scan, starting at the front page.
    pub max_pages: usize,
    pub max_urls: Option<usize>,
    /// Pause after each successful article fetch.
    pub delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            site_url: listing::DEFAULT_SITE_URL.to_string(),
            listing_selector: listing::DEFAULT_LISTING_SELECTOR.to_string(),
            max_pages: 1,
            max_urls: None,
            delay: Duration::from_secs(1),
        }
    }
}

/// Per-run outcome counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    pub discovered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub persisted: usize,
}

/// Wrap a record in its envelope, stamped with the run start instant.
pub fn envelope_for(url: &str, data: ExtractionRecord, started_at: &DateTime<Utc>) -> Envelope {
    Envelope {
        id: identity_of(url),
        url: url.to_string(),
        created_at_utc: utc_stamp(started_at),
        data,
    }
}

/// Execute one harvest run and write its run-result file.
///
/// Only an invalid listing configuration or a failure to write the
/// run-result file is returned as an error.
#[instrument(level = "info", skip_all, fields(root = %config.output_root.display()))]
pub async fn run(
    config: &CrawlConfig,
    session: &Session,
    started_at: DateTime<Utc>,
) -> Result<RunSummary, CrawlError> {
    let site = ListingSite::new(&config.site_url, &config.listing_selector)?;
    let partition = Partition::for_instant(&started_at);
    let partition_dir = partition.dir(&config.output_root);
    info!(partition = %partition.relative_dir().display(), "Target partition");

    let urls = discover(session, &site, config.max_pages, config.max_urls).await;
    let mut tally = RunTally {
        discovered: urls.len(),
        ..RunTally::default()
    };
    let mut summary = RunSummary::default();

    for (i, url) in urls.iter().enumerate() {
        if !should_process(url, &partition_dir) {
            tally.skipped += 1;
            continue;
        }

        let record = match article::extract(session, url).await {
            Ok(record) => record,
            Err(e) => {
                tally.failed += 1;
                warn!(%url, error = %e, timeout = e.is_timeout(), "Article fetch failed; skipping");
                continue;
            }
        };

        let envelope = envelope_for(url, record, &started_at);
        match persist_envelope(&envelope, &partition_dir).await {
            Ok(_) => {
                tally.persisted += 1;
                let rel = partition.relative_dir().join(file_name(&envelope.id));
                summary.new_paths.push(rel.to_string_lossy().replace('\\', "/"));
                info!(%url, id = %envelope.id, "New article saved");
            }
            Err(e) => {
                tally.failed += 1;
                error!(%url, error = %e, "Persisting article failed");
            }
        }

        if i + 1 < urls.len() && !config.delay.is_zero() {
            sleep(config.delay).await;
        }
    }

    summary.new_files = tally.persisted;
    info!(
        discovered = tally.discovered,
        skipped = tally.skipped,
        failed = tally.failed,
        new_files = tally.persisted,
        "Run finished"
    );
    write_run_summary(&config.output_root, &summary).await?;
    Ok(summary)
}
