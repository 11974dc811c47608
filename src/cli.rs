//! Command-line interface definitions for Blog Harvester.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it, which is how scheduled runs configure the crawler.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::CrawlError;
use crate::pipeline::CrawlConfig;
use crate::scrapers::listing::{DEFAULT_LISTING_SELECTOR, DEFAULT_SITE_URL};

/// Command-line arguments for one harvest run.
///
/// # Examples
///
/// ```sh
/// # Front page only, one second between articles
/// blog_harvester
///
/// # Three listing pages into ./archive, no pause
/// MAX_PAGES_FROM_HOME=3 SLEEP_SEC=0 blog_harvester -o ./archive
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing pages to scan, starting at the front page
    #[arg(short = 'p', long, env = "MAX_PAGES_FROM_HOME", default_value_t = 1)]
    pub max_pages: usize,

    /// Seconds to pause after each fetched article
    #[arg(short, long, env = "SLEEP_SEC", default_value_t = 1.0)]
    pub sleep_sec: f64,

    /// Directory holding by_created/ and .action_result.json
    #[arg(short, long, env = "CRAWL_OUTPUT_ROOT", default_value = ".")]
    pub output_root: PathBuf,

    /// Keep at most this many discovered URLs (0 means no cap)
    #[arg(long, env = "MAX_URLS")]
    pub max_urls: Option<usize>,

    /// Aggregator front page
    #[arg(long, env = "SITE_URL", default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// CSS selector for post links on listing pages
    #[arg(long, env = "LISTING_SELECTOR", default_value = DEFAULT_LISTING_SELECTOR)]
    pub listing_selector: String,
}

impl Cli {
    /// Validate the arguments into a run configuration.
    pub fn into_config(self) -> Result<CrawlConfig, CrawlError> {
        let delay = Duration::try_from_secs_f64(self.sleep_sec)
            .map_err(|e| CrawlError::Config(format!("sleep of {}s: {e}", self.sleep_sec)))?;
        Ok(CrawlConfig {
            output_root: self.output_root,
            site_url: self.site_url,
            listing_selector: self.listing_selector,
            max_pages: self.max_pages,
            max_urls: self.max_urls.filter(|&cap| cap > 0),
            delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "blog_harvester",
            "--max-pages",
            "3",
            "--sleep-sec",
            "0.5",
            "--output-root",
            "/tmp/archive",
            "--max-urls",
            "20",
        ]);

        assert_eq!(cli.max_pages, 3);
        assert_eq!(cli.sleep_sec, 0.5);
        assert_eq!(cli.output_root, PathBuf::from("/tmp/archive"));
        assert_eq!(cli.max_urls, Some(20));

        let config = cli.into_config().unwrap();
        assert_eq!(config.delay, Duration::from_millis(500));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["blog_harvester", "-p", "2", "-s", "0", "-o", "out"]);
        assert_eq!(cli.max_pages, 2);
        assert_eq!(cli.output_root, PathBuf::from("out"));
        assert!(cli.into_config().unwrap().delay.is_zero());
    }

    #[test]
    fn test_zero_max_urls_means_uncapped() {
        let cli = Cli::parse_from(["blog_harvester", "--max-urls", "0"]);
        assert_eq!(cli.max_urls, Some(0));
        assert_eq!(cli.into_config().unwrap().max_urls, None);
    }

    #[test]
    fn test_negative_sleep_rejected() {
        let cli = Cli::parse_from(["blog_harvester", "--sleep-sec=-1"]);
        assert!(matches!(cli.into_config(), Err(CrawlError::Config(_))));
    }
}
