//! Error taxonomy for the harvest pipeline.
//!
//! Every variant carries the URL or path it concerns so the orchestrator can
//! log one self-contained line per failure and move on to the next URL.
//! Malformed JSON-LD blocks are deliberately absent here: they are skipped
//! inside the extractor and never surface as errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while discovering, fetching, or persisting articles.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A listing page could not be fetched; pagination stops here.
    #[error("listing page {url} unavailable: {source}")]
    Discovery {
        /// The listing page URL.
        url: String,
        /// The transport failure behind it.
        #[source]
        source: Box<CrawlError>,
    },

    /// Network-level failure (DNS, connect, TLS, read timeout).
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        /// The URL being fetched.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL being fetched.
        url: String,
        /// The status code returned.
        status: u16,
    },

    /// An image payload exceeded the inline size ceiling.
    #[error("image {url} is {bytes} bytes, over the {limit}-byte ceiling")]
    ImageTooLarge {
        /// The image URL.
        url: String,
        /// Observed or advertised payload size.
        bytes: u64,
        /// The configured ceiling.
        limit: u64,
    },

    /// A URL could not be parsed or resolved.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// The parse failure.
        #[source]
        source: url::ParseError,
    },

    /// File system failure while writing output.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path being created or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An envelope or run summary could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A configuration value was rejected before the run started.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CrawlError {
    /// Wraps a transport error from reqwest, keeping the URL it concerned.
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Wraps an IO error with the path it concerned.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Marks a transport failure as a listing-page discovery failure.
    pub fn discovery(url: impl Into<String>, source: CrawlError) -> Self {
        Self::Discovery {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// True when the failure was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_timeout(),
            Self::Discovery { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
