//! HTTP session shared by every fetch in a run.
//!
//! A [`Session`] wraps a single `reqwest::Client` carrying a fixed
//! browser-like User-Agent. Page fetches use the page timeout; image
//! captures use a shorter timeout and a byte ceiling. Non-2xx responses are
//! surfaced as [`CrawlError::HttpStatus`]. Nothing here retries.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};

use crate::error::CrawlError;

/// Identity header sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Timeout applied to listing and article page fetches.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to each best-effort image capture.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest image payload that will be inlined.
pub const MAX_IMAGE_BYTES: u64 = 500_000;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects.
    pub url: String,
    /// Decoded response body.
    pub body: String,
}

/// Reusable HTTP session.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    page_timeout: Duration,
    image_timeout: Duration,
    max_image_bytes: u64,
}

impl Session {
    /// Builds a session with the default timeouts and image ceiling.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_limits(PAGE_TIMEOUT, IMAGE_TIMEOUT, MAX_IMAGE_BYTES)
    }

    /// Builds a session with explicit timeouts and image ceiling.
    pub fn with_limits(
        page_timeout: Duration,
        image_timeout: Duration,
        max_image_bytes: u64,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            page_timeout,
            image_timeout,
            max_image_bytes,
        })
    }

    /// GET a page and return its final URL and text body.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_page(&self, url: &str) -> Result<Page, CrawlError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.page_timeout)
            .send()
            .await
            .map_err(|e| CrawlError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = resp.url().to_string();
        let body = resp.text().await.map_err(|e| CrawlError::fetch(url, e))?;
        debug!(final_url = %final_url, bytes = body.len(), "Fetched page");
        Ok(Page {
            url: final_url,
            body,
        })
    }

    /// GET an image, rejecting payloads over the configured ceiling.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_image(&self, url: &str) -> Result<Vec<u8>, CrawlError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.image_timeout)
            .send()
            .await
            .map_err(|e| CrawlError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(advertised) = resp.content_length() {
            if advertised > self.max_image_bytes {
                return Err(CrawlError::ImageTooLarge {
                    url: url.to_string(),
                    bytes: advertised,
                    limit: self.max_image_bytes,
                });
            }
        }

        let bytes = resp.bytes().await.map_err(|e| CrawlError::fetch(url, e))?;
        if bytes.len() as u64 > self.max_image_bytes {
            return Err(CrawlError::ImageTooLarge {
                url: url.to_string(),
                bytes: bytes.len() as u64,
                limit: self.max_image_bytes,
            });
        }
        Ok(bytes.to_vec())
    }
}
