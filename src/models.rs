//! Data models for captured articles and their persisted form.
//!
//! - [`ExtractionRecord`]: everything pulled out of one article page
//! - [`LinkRef`] / [`ImageRef`]: link and image inventory entries
//! - [`Envelope`]: the unit written to disk, one per identity and partition
//! - [`RunSummary`]: the run-result file consumed by the stats report
//!
//! Field names are serialized verbatim (snake_case) because the envelope
//! files on disk are read by other tooling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A hyperlink found inside the article's main content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkRef {
    /// Absolute URL, resolved against the article URL.
    pub href: String,
    /// Visible anchor text, `None` when empty.
    pub text: Option<String>,
}

/// An image found inside the article's main content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageRef {
    /// Absolute image URL.
    pub src: String,
    /// Alt text, `None` when missing or blank.
    pub alt: Option<String>,
    /// `data:<mime>;base64,...` URI when the bounded capture succeeded.
    pub base64: Option<String>,
}

/// Structured result of processing one article.
///
/// Every field except `url` is best-effort: a missing source yields `None`
/// (or an empty list) rather than failing the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExtractionRecord {
    /// Final URL after redirects.
    pub url: String,
    pub canonical_url: Option<String>,

    pub html_title: Option<String>,
    pub h1_title: Option<String>,

    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,

    /// The JSON-LD article object exactly as found on the page.
    pub raw_jsonld_article: Option<Value>,
    /// `headline`, `datePublished` and `dateModified` are kept as found.
    pub article_headline: Option<Value>,
    /// `articleSection`; schema.org allows a string or a list.
    pub article_section: Option<Value>,
    /// `keywords`; schema.org allows a string or a list.
    pub article_tags: Option<Value>,
    pub article_author: Option<String>,
    pub article_published: Option<Value>,
    pub article_modified: Option<Value>,

    /// Cleaned plain text of the main content block.
    pub main_text: String,
    /// Serialized main content markup with noise elements removed.
    pub main_html: String,

    pub word_count: usize,
    /// `word_count / 200`, one decimal place.
    pub reading_time_min: f64,

    pub internal_links: Vec<LinkRef>,
    pub external_links: Vec<LinkRef>,
    pub images: Vec<ImageRef>,

    /// `lang` attribute of the root element.
    pub lang: Option<String>,

    /// Capture instant, `YYYY-MM-DDTHH:MM:SSZ`.
    pub crawled_at_utc: String,
}

/// The persisted unit: one extraction wrapped with identity metadata.
///
/// Written once by the persistence writer and never updated.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Envelope {
    /// Article identity, also the file stem.
    pub id: String,
    /// The candidate URL as discovered on the listing page.
    pub url: String,
    /// Run start instant, `YYYY-MM-DDTHH:MM:SSZ`.
    pub created_at_utc: String,
    pub data: ExtractionRecord,
}

/// Outcome of one run, overwritten each time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunSummary {
    /// Number of envelopes newly persisted.
    pub new_files: usize,
    /// Paths of those envelopes, relative to the output root.
    pub new_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_summary_serialization() {
        let summary = RunSummary {
            new_files: 1,
            new_paths: vec!["by_created/2025/05/abc.json".to_string()],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"new_files":1,"new_paths":["by_created/2025/05/abc.json"]}"#
        );
    }

    #[test]
    fn test_envelope_preserves_non_ascii() {
        let envelope = Envelope {
            id: "abc".to_string(),
            url: "https://example.com/2025/05/cafe/".to_string(),
            created_at_utc: "2025-05-06T12:00:00Z".to_string(),
            data: ExtractionRecord {
                url: "https://example.com/2025/05/cafe/".to_string(),
                html_title: Some("Café ümlaut 日本".to_string()),
                ..Default::default()
            },
        };
        let json = serde_json::to_string_pretty(&envelope).unwrap();
        assert!(json.contains("Café ümlaut 日本"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r#"{
            "id": "abc",
            "url": "https://example.com/2025/05/post/",
            "created_at_utc": "2025-05-06T12:00:00Z",
            "data": {
                "url": "https://example.com/2025/05/post/",
                "canonical_url": null,
                "html_title": "Post",
                "h1_title": null,
                "meta_description": null,
                "meta_keywords": null,
                "og_title": null,
                "og_description": null,
                "og_image": null,
                "twitter_title": null,
                "twitter_description": null,
                "raw_jsonld_article": null,
                "article_headline": null,
                "article_section": null,
                "article_tags": ["r", "stats"],
                "article_author": null,
                "article_published": null,
                "article_modified": null,
                "main_text": "Hello",
                "main_html": "<article>Hello</article>",
                "word_count": 1,
                "reading_time_min": 0.0,
                "internal_links": [],
                "external_links": [{"href": "https://other.org/", "text": null}],
                "images": [],
                "lang": "en-US",
                "crawled_at_utc": "2025-05-06T12:00:01Z"
            }
        }"#;

        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.html_title.as_deref(), Some("Post"));
        assert_eq!(envelope.data.external_links.len(), 1);
        assert_eq!(envelope.data.article_tags.unwrap().as_array().unwrap().len(), 2);
    }
}
