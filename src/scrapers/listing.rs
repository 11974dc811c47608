//! Listing page scanner.
//!
//! Walks the aggregator's paginated front pages and collects candidate
//! article URLs.
//!
//! # URL Pattern
//!
//! Page 1 is the site root, page N is `<site>/page/N/`. Article links are the
//! anchors matched by the listing selector (`h3 > a` by default) whose
//! fragment-stripped URL lives on the site and whose first path segment is a
//! four-digit year, e.g. `https://www.r-bloggers.com/2025/05/some-post/`.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::CrawlError;
use crate::http::Session;

/// Default aggregator front page.
pub const DEFAULT_SITE_URL: &str = "https://www.r-bloggers.com/";

/// Default selector for post title links on listing pages.
pub const DEFAULT_LISTING_SELECTOR: &str = "h3 > a";

/// The listing side of a site: where its pages live and how links look.
#[derive(Debug, Clone)]
pub struct ListingSite {
    root: Url,
    selector: Selector,
}

impl ListingSite {
    /// Validate the site URL and selector.
    pub fn new(site_url: &str, selector: &str) -> Result<Self, CrawlError> {
        let mut root = Url::parse(site_url).map_err(|source| CrawlError::InvalidUrl {
            url: site_url.to_string(),
            source,
        })?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let selector = Selector::parse(selector)
            .map_err(|e| CrawlError::Config(format!("listing selector {selector:?}: {e}")))?;
        Ok(Self { root, selector })
    }

    /// URL of listing page `page` (1-based).
    pub fn page_url(&self, page: usize) -> String {
        if page <= 1 {
            return self.root.to_string();
        }
        match self.root.join(&format!("page/{page}/")) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}page/{page}/", self.root),
        }
    }

    /// Raw `href`s of every anchor the selector matches, in page order.
    ///
    /// Anchors without an `href` appear as `None` so the caller still sees
    /// how many anchors matched.
    pub fn listing_anchors(&self, body: &str) -> Vec<Option<String>> {
        let document = Html::parse_document(body);
        document
            .select(&self.selector)
            .map(|a| a.value().attr("href").map(String::from))
            .collect()
    }

    /// Strip the fragment from `href` and keep it only if it looks like an
    /// article on this site.
    ///
    /// Absolute hrefs are returned as written (minus the fragment), since the
    /// identity hash is taken over that exact text; relative hrefs are resolved
    /// against the page they were found on.
    pub fn candidate(&self, href: &str, page_url: &Url) -> Option<String> {
        let href = href.trim();
        let stripped = href.split_once('#').map_or(href, |(before, _)| before);
        let url = page_url.join(stripped).ok()?;
        if !self.is_article_url(&url) {
            return None;
        }
        match Url::parse(stripped) {
            Ok(_) => Some(stripped.to_string()),
            Err(_) => Some(url.to_string()),
        }
    }

    /// Same origin as the site, with a four-digit year as the first path
    /// segment below the site root.
    pub fn is_article_url(&self, url: &Url) -> bool {
        if url.origin() != self.root.origin() {
            return false;
        }
        let Some(rest) = url.path().strip_prefix(self.root.path()) else {
            return false;
        };
        let year = rest.split('/').next().unwrap_or("");
        year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Collect candidate article URLs from up to `max_pages` listing pages.
///
/// Pagination stops early at the first page with no selector matches, or at
/// the first listing fetch failure (URLs gathered so far are kept). URLs are
/// unique and in order of first appearance; `max_urls` truncates the result.
#[instrument(level = "info", skip(session, site), fields(site = %site.root))]
pub async fn discover(
    session: &Session,
    site: &ListingSite,
    max_pages: usize,
    max_urls: Option<usize>,
) -> Vec<String> {
    let mut urls = Vec::new();
    let mut seen = HashSet::new();

    for page in 1..=max_pages {
        let list_url = site.page_url(page);
        let listing = match session.get_page(&list_url).await {
            Ok(listing) => listing,
            Err(e) => {
                let err = CrawlError::discovery(&list_url, e);
                warn!(error = %err, "Listing fetch failed; stopping pagination");
                break;
            }
        };
        let page_url = match Url::parse(&listing.url) {
            Ok(u) => u,
            Err(e) => {
                warn!(url = %listing.url, error = %e, "Unparseable listing URL; stopping pagination");
                break;
            }
        };

        let anchors = site.listing_anchors(&listing.body);
        if anchors.is_empty() {
            info!(page, url = %list_url, "No listing anchors; stopping pagination");
            break;
        }

        let before = urls.len();
        for href in anchors.iter().flatten() {
            match site.candidate(href, &page_url) {
                Some(candidate) => {
                    if seen.insert(candidate.clone()) {
                        urls.push(candidate);
                    }
                }
                None => debug!(%href, "Rejected non-article link"),
            }
        }
        info!(
            page,
            anchors = anchors.len(),
            added = urls.len() - before,
            "Scanned listing page"
        );
    }

    if let Some(cap) = max_urls {
        urls.truncate(cap);
    }
    info!(count = urls.len(), "Indexed candidate article URLs");
    debug!(urls = ?urls, "Candidate URLs");
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_html(hrefs: &[&str]) -> String {
        let items: String = hrefs
            .iter()
            .map(|h| format!(r#"<div class="post"><h3><a href="{h}">Title</a></h3></div>"#))
            .collect();
        format!("<html><body>{items}<footer><a href=\"/privacy/\">Privacy</a></footer></body></html>")
    }

    async fn mount_page(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_page_urls() {
        let site = ListingSite::new("https://www.r-bloggers.com", DEFAULT_LISTING_SELECTOR).unwrap();
        assert_eq!(site.page_url(1), "https://www.r-bloggers.com/");
        assert_eq!(site.page_url(3), "https://www.r-bloggers.com/page/3/");
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let err = ListingSite::new(DEFAULT_SITE_URL, "h3 >").unwrap_err();
        assert!(matches!(err, CrawlError::Config(_)));
    }

    #[test]
    fn test_candidate_filtering() {
        let site = ListingSite::new(DEFAULT_SITE_URL, DEFAULT_LISTING_SELECTOR).unwrap();
        let page = Url::parse(DEFAULT_SITE_URL).unwrap();
        assert_eq!(
            site.candidate("https://www.r-bloggers.com/2025/05/post/#comments", &page),
            Some("https://www.r-bloggers.com/2025/05/post/".to_string())
        );
        assert_eq!(
            site.candidate("/2024/12/relative/", &page),
            Some("https://www.r-bloggers.com/2024/12/relative/".to_string())
        );
        assert_eq!(
            site.candidate(" https://www.r-bloggers.com/2025/05/données-ouvertes/#top", &page),
            Some("https://www.r-bloggers.com/2025/05/données-ouvertes/".to_string())
        );
        assert_eq!(site.candidate("https://www.r-bloggers.com/privacy-policy/", &page), None);
        assert_eq!(site.candidate("https://www.r-bloggers.com/202/x/", &page), None);
        assert_eq!(site.candidate("https://other.com/2025/05/post/", &page), None);
        assert_eq!(site.candidate("http://www.r-bloggers.com/2025/05/post/", &page), None);
    }

    #[tokio::test]
    async fn test_discover_keeps_matching_links_in_page_order() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_page(
            &server,
            "/",
            listing_html(&[
                &format!("{base}/2025/05/first/"),
                &format!("{base}/privacy-policy/"),
                &format!("{base}/2025/05/second/#respond"),
                "https://elsewhere.org/2025/05/x/",
                &format!("{base}/2025/04/third/"),
            ]),
        )
        .await;

        let session = Session::new().unwrap();
        let site = ListingSite::new(&base, DEFAULT_LISTING_SELECTOR).unwrap();
        let urls = discover(&session, &site, 1, None).await;
        assert_eq!(
            urls,
            vec![
                format!("{base}/2025/05/first/"),
                format!("{base}/2025/05/second/"),
                format!("{base}/2025/04/third/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_dedups_across_pages_and_stops_on_empty_page() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_page(&server, "/", listing_html(&[&format!("{base}/2025/05/a/"), &format!("{base}/2025/05/b/")])).await;
        mount_page(&server, "/page/2/", listing_html(&[&format!("{base}/2025/05/b/"), &format!("{base}/2025/05/c/")])).await;
        mount_page(&server, "/page/3/", "<html><body><p>nothing</p></body></html>".to_string()).await;
        Mock::given(method("GET"))
            .and(path("/page/4/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[&format!("{base}/2025/05/d/")])))
            .expect(0)
            .mount(&server)
            .await;

        let session = Session::new().unwrap();
        let site = ListingSite::new(&base, DEFAULT_LISTING_SELECTOR).unwrap();
        let urls = discover(&session, &site, 5, None).await;
        assert_eq!(
            urls,
            vec![
                format!("{base}/2025/05/a/"),
                format!("{base}/2025/05/b/"),
                format!("{base}/2025/05/c/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_keeps_partial_results_on_listing_failure() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_page(&server, "/", listing_html(&[&format!("{base}/2025/05/a/")])).await;
        Mock::given(method("GET"))
            .and(path("/page/2/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = Session::with_limits(
            Duration::from_secs(5),
            crate::http::IMAGE_TIMEOUT,
            crate::http::MAX_IMAGE_BYTES,
        )
        .unwrap();
        let site = ListingSite::new(&base, DEFAULT_LISTING_SELECTOR).unwrap();
        let urls = discover(&session, &site, 3, None).await;
        assert_eq!(urls, vec![format!("{base}/2025/05/a/")]);
    }

    #[tokio::test]
    async fn test_discover_applies_cap_after_dedup() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_page(
            &server,
            "/",
            listing_html(&[
                &format!("{base}/2025/05/a/"),
                &format!("{base}/2025/05/a/"),
                &format!("{base}/2025/05/b/"),
                &format!("{base}/2025/05/c/"),
            ]),
        )
        .await;

        let session = Session::new().unwrap();
        let site = ListingSite::new(&base, DEFAULT_LISTING_SELECTOR).unwrap();
        let urls = discover(&session, &site, 1, Some(2)).await;
        assert_eq!(urls, vec![format!("{base}/2025/05/a/"), format!("{base}/2025/05/b/")]);
    }
}
