//! JSON output: article envelopes and the run-result file.
//!
//! # Output Structure
//!
//! ```text
//! <root>/
//! ├── .action_result.json        # {"new_files": N, "new_paths": [...]}
//! └── by_created/
//!     └── 2025/
//!         └── 05/
//!             ├── 3f786850e387550fdab836ed7e6dc881de23001b.json
//!             └── 89e6c98d92887913cadf06b2adb97f26cde4849b.json
//! ```
//!
//! # Write-once envelopes
//!
//! Envelopes are written to a hidden temp file in the partition directory
//! and renamed into place, so `<id>.json` either exists complete or not at
//! all. The dedup check relies on this.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::CrawlError;
use crate::identity::file_name;
use crate::models::{Envelope, RunSummary};

/// Run-result file name under the output root.
pub const ACTION_RESULT_FILE: &str = ".action_result.json";

/// Write `envelope` as `<partition_dir>/<id>.json`.
///
/// Creates the partition directory if needed. Output is pretty-printed
/// UTF-8 with non-ASCII characters left unescaped.
#[instrument(level = "info", skip_all, fields(id = %envelope.id, dir = %partition_dir.display()))]
pub async fn persist_envelope(
    envelope: &Envelope,
    partition_dir: &Path,
) -> Result<PathBuf, CrawlError> {
    let json = serde_json::to_string_pretty(envelope)?;

    if let Err(e) = fs::create_dir_all(partition_dir).await {
        error!(error = %e, "Failed to create partition dir");
        return Err(CrawlError::io(partition_dir, e));
    }

    let final_path = partition_dir.join(file_name(&envelope.id));
    let temp_path = partition_dir.join(format!(".{}.tmp", file_name(&envelope.id)));

    fs::write(&temp_path, json)
        .await
        .map_err(|e| CrawlError::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, &final_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(CrawlError::io(&final_path, e));
    }

    info!(path = %final_path.display(), "Wrote envelope");
    Ok(final_path)
}

/// Overwrite `<root>/.action_result.json` with `summary`.
#[instrument(level = "info", skip_all, fields(root = %root.display(), new_files = summary.new_files))]
pub async fn write_run_summary(root: &Path, summary: &RunSummary) -> Result<PathBuf, CrawlError> {
    let json = serde_json::to_string(summary)?;
    let path = root.join(ACTION_RESULT_FILE);
    fs::write(&path, json)
        .await
        .map_err(|e| CrawlError::io(&path, e))?;
    info!(path = %path.display(), "Wrote run result");
    Ok(path)
}
