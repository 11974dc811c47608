//! Article identity and presence-only dedup.
//!
//! An article's identity is the SHA-1 hex digest of its candidate URL
//! string. The identity names the envelope file and is the only dedup key:
//! a URL is skipped when `<partition>/<identity>.json` already exists.
//!
//! Partitions are keyed by the *run's* UTC year and month, so an article
//! re-discovered after a month rollover is captured again under the new
//! partition. Only the current partition is consulted.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use sha1::{Digest, Sha1};

/// Directory under the output root holding all partitions.
pub const BY_CREATED_DIR: &str = "by_created";

/// Deterministic identity of a candidate URL (40 lowercase hex chars).
pub fn identity_of(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Year/month output partition captured once at run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
}

impl Partition {
    /// Partition for the given instant.
    pub fn for_instant(at: &DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Path of this partition relative to the output root.
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(BY_CREATED_DIR)
            .join(format!("{:04}", self.year))
            .join(format!("{:02}", self.month))
    }

    /// Absolute partition directory under `root`.
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(self.relative_dir())
    }
}

/// File name for an identity.
pub fn file_name(id: &str) -> String {
    format!("{id}.json")
}

/// True unless an envelope for `url` already exists in `partition_dir`.
pub fn should_process(url: &str, partition_dir: &Path) -> bool {
    !partition_dir.join(file_name(&identity_of(url))).exists()
}
