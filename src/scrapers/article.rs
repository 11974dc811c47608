//! Article page extraction.
//!
//! Builds an [`ExtractionRecord`] from one article URL. Parsing is a pure
//! step over the fetched HTML ([`parse_article`]); image capture and the
//! capture timestamp happen afterwards in [`extract`], once the parsed
//! document has been dropped.
//!
//! Metadata fields are resolved through fixed priority lists of sources, the
//! first source yielding a non-empty value wins.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::content::{
    block_text, collect_images, collect_links, image_mime, inline_text, render_filtered,
    select_main_block,
};
use super::jsonld::{ArticleFields, find_article};
use crate::error::CrawlError;
use crate::http::Session;
use crate::models::{ExtractionRecord, ImageRef};
use crate::utils::{clean_text, reading_time_min, truncate_for_log, utc_stamp, word_count};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static CANONICAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel~="canonical"][href]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

/// A `<meta>` lookup: attribute to match on and the key it must equal.
type MetaSource = (&'static str, &'static str);

const DESCRIPTION: &[MetaSource] = &[("name", "description")];
const KEYWORDS: &[MetaSource] = &[("name", "keywords")];
const OG_TITLE: &[MetaSource] = &[("property", "og:title"), ("name", "og:title")];
const OG_DESCRIPTION: &[MetaSource] =
    &[("property", "og:description"), ("name", "og:description")];
const OG_IMAGE: &[MetaSource] = &[("property", "og:image"), ("name", "og:image")];
const TWITTER_TITLE: &[MetaSource] = &[("name", "twitter:title"), ("property", "twitter:title")];
const TWITTER_DESCRIPTION: &[MetaSource] = &[
    ("name", "twitter:description"),
    ("property", "twitter:description"),
];

/// Fetch `url` and extract its record, inlining images best-effort.
///
/// Fails only when the page fetch fails or returns a non-success status.
#[instrument(level = "info", skip(session))]
pub async fn extract(session: &Session, url: &str) -> Result<ExtractionRecord, CrawlError> {
    let page = session.get_page(url).await?;
    let mut record = parse_article(&page.url, &page.body)?;

    let images = std::mem::take(&mut record.images);
    record.images = inline_images(session, images).await;
    record.crawled_at_utc = utc_stamp(&Utc::now());

    info!(
        title = %truncate_for_log(record.html_title.as_deref().unwrap_or(""), 80),
        words = record.word_count,
        internal = record.internal_links.len(),
        external = record.external_links.len(),
        images = record.images.len(),
        "Extracted article"
    );
    Ok(record)
}

/// Pure extraction over fetched HTML; `final_url` is the post-redirect URL.
///
/// Images come back without inline payloads and `crawled_at_utc` is empty.
pub fn parse_article(final_url: &str, body: &str) -> Result<ExtractionRecord, CrawlError> {
    let base = Url::parse(final_url).map_err(|source| CrawlError::InvalidUrl {
        url: final_url.to_string(),
        source,
    })?;
    let doc = Html::parse_document(body);

    let jsonld = find_article(&doc);
    let fields = jsonld
        .as_ref()
        .map(ArticleFields::from_article)
        .unwrap_or_default();

    let block = select_main_block(&doc);
    let main_text = clean_text(&block_text(block));
    let words = word_count(&main_text);
    let (internal_links, external_links) = collect_links(block, &base);

    Ok(ExtractionRecord {
        url: final_url.to_string(),
        canonical_url: doc
            .select(&CANONICAL)
            .next()
            .and_then(|l| l.value().attr("href"))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from),
        html_title: first_text(&doc, &TITLE),
        h1_title: first_text(&doc, &H1),
        meta_description: meta_content(&doc, DESCRIPTION),
        meta_keywords: meta_content(&doc, KEYWORDS),
        og_title: meta_content(&doc, OG_TITLE),
        og_description: meta_content(&doc, OG_DESCRIPTION),
        og_image: meta_content(&doc, OG_IMAGE),
        twitter_title: meta_content(&doc, TWITTER_TITLE),
        twitter_description: meta_content(&doc, TWITTER_DESCRIPTION),
        article_headline: fields.headline,
        article_section: fields.section,
        article_tags: fields.tags,
        article_author: fields.author,
        article_published: fields.published,
        article_modified: fields.modified,
        raw_jsonld_article: jsonld,
        main_html: render_filtered(block),
        main_text,
        word_count: words,
        reading_time_min: reading_time_min(words),
        internal_links,
        external_links,
        images: collect_images(block, &base),
        lang: doc.root_element().value().attr("lang").map(String::from),
        crawled_at_utc: String::new(),
    })
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .map(inline_text)
        .filter(|t| !t.is_empty())
}

/// First non-empty `content` across `sources`, in priority order.
fn meta_content(doc: &Html, sources: &[MetaSource]) -> Option<String> {
    sources.iter().find_map(|&(attr, key)| {
        doc.select(&META)
            .find(|m| m.value().attr(attr) == Some(key))
            .and_then(|m| m.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
    })
}

/// Attach `data:` URIs to images whose bytes could be captured.
async fn inline_images(session: &Session, images: Vec<ImageRef>) -> Vec<ImageRef> {
    let mut out = Vec::with_capacity(images.len());
    for mut image in images {
        match session.get_image(&image.src).await {
            Ok(bytes) => {
                image.base64 = Some(format!(
                    "data:{};base64,{}",
                    image_mime(&image.src),
                    STANDARD.encode(&bytes)
                ));
            }
            Err(e) => debug!(src = %image.src, error = %e, "Image capture skipped"),
        }
        out.push(image);
    }
    out
}
