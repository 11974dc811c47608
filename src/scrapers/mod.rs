//! Scrapers for the aggregator's listing pages and article pages.
//!
//! Scraping follows the usual two-phase pattern:
//!
//! 1. **Indexing**: [`listing::discover`] walks the paginated front pages and
//!    returns candidate article URLs in page order.
//! 2. **Fetching**: [`article::extract`] fetches one article and builds an
//!    [`ExtractionRecord`](crate::models::ExtractionRecord).
//!
//! # Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | [`listing`] | Pagination, anchor filtering, order-preserving dedup |
//! | [`article`] | Titles, meta tags, assembly of the record, image capture |
//! | [`jsonld`] | JSON-LD article detection and author shapes |
//! | [`content`] | Main block choice, noise-free text/markup, link and image inventory |
//!
//! Every extraction step is best-effort: a missing source yields `None`,
//! never an error. Only the page fetch itself can fail an article.

pub mod article;
pub mod content;
pub mod jsonld;
pub mod listing;
