//! Utility functions for text cleanup, timestamps, and file system checks.
//!
//! - Text normalization, word counting, and reading time for extracted bodies
//! - UTC timestamp formatting shared by records and envelopes
//! - String truncation for log lines
//! - Output directory validation

use std::cmp::Ordering;
use std::fs as stdfs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::CrawlError;

static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Words per minute used for reading time.
pub const READING_WPM: f64 = 200.0;

/// Normalize extracted text.
///
/// Line endings become `\n`, runs of two or more newlines collapse to a
/// single blank line, and surrounding whitespace is trimmed.
pub fn clean_text(txt: &str) -> String {
    let unix = LINE_ENDINGS.replace_all(txt, "\n");
    let collapsed = BLANK_RUNS.replace_all(&unix, "\n\n");
    collapsed.trim().to_string()
}

/// Count maximal runs of Unicode word characters.
pub fn word_count(txt: &str) -> usize {
    WORDS.find_iter(txt).count()
}

/// Reading time in minutes at [`READING_WPM`], rounded to one decimal.
///
/// Rounds the stored quotient `words / READING_WPM` half to even, so a
/// decimal tie only counts as one when the quotient is exact in binary.
pub fn reading_time_min(words: usize) -> f64 {
    let words = words as f64;
    let tenths = words * 10.0 / READING_WPM;
    let rounded = if tenths.fract() == 0.5 {
        let minutes = words / READING_WPM;
        match minutes.mul_add(READING_WPM, -words).partial_cmp(&0.0) {
            Some(Ordering::Greater) => tenths.ceil(),
            Some(Ordering::Less) => tenths.floor(),
            _ => tenths.round_ties_even(),
        }
    } else {
        tenths.round()
    };
    rounded / 10.0
}

/// Format an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_stamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last char boundary at or before `max` bytes
/// and suffixed with `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), CrawlError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(CrawlError::io(probe_path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clean_text_normalizes_line_endings() {
        assert_eq!(clean_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_clean_text_collapses_blank_runs() {
        assert_eq!(clean_text("  one\n\n\n\ntwo\n\nthree\n  "), "one\n\ntwo\n\nthree");
        assert_eq!(clean_text("x\r\n\r\n\r\ny"), "x\n\ny");
    }

    #[test]
    fn test_word_count_is_unicode_aware() {
        assert_eq!(word_count("Hello, world! ça va? 日本語 x_y 42"), 7);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("--- ... !!!"), 0);
    }

    #[test]
    fn test_reading_time_400_words_is_two_minutes() {
        let text = vec!["word"; 400].join(" ");
        let words = word_count(&text);
        assert_eq!(words, 400);
        assert_eq!(reading_time_min(words), 2.0);
    }

    #[test]
    fn test_reading_time_rounds_to_one_decimal() {
        assert_eq!(reading_time_min(0), 0.0);
        assert_eq!(reading_time_min(150), 0.8);
        assert_eq!(reading_time_min(1234), 6.2);
    }

    #[test]
    fn test_reading_time_ties_round_half_even() {
        assert_eq!(reading_time_min(50), 0.2);
        assert_eq!(reading_time_min(250), 1.2);
        assert_eq!(reading_time_min(450), 2.2);
        assert_eq!(reading_time_min(650), 3.2);
    }

    #[test]
    fn test_reading_time_inexact_quotients_round_by_stored_value() {
        // 0.05 is stored slightly above, 0.15 slightly below
        assert_eq!(reading_time_min(10), 0.1);
        assert_eq!(reading_time_min(30), 0.1);
    }

    #[test]
    fn test_utc_stamp_has_second_precision() {
        let at = Utc.with_ymd_and_hms(2025, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(utc_stamp(&at), "2025-05-06T07:08:09Z");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("nested").join("out");
        ensure_writable_dir(&target).await.unwrap();
        assert!(target.is_dir());
        assert!(!target.join("..__probe_write__").exists());
    }
}
