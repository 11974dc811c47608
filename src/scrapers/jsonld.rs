//! JSON-LD article detection.
//!
//! Scans every `application/ld+json` script, accepts the first object (or
//! first object inside a top-level list) whose `@type` names an article, and
//! pulls the article fields out of it. Blocks that fail to parse are skipped.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// `@type` values (lowercased) accepted as an article.
const ARTICLE_TYPES: [&str; 2] = ["article", "blogposting"];

/// First JSON-LD object on the page typed as an article.
pub fn find_article(doc: &Html) -> Option<Value> {
    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let data: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Skipping malformed JSON-LD block");
                continue;
            }
        };
        let items = match data {
            Value::Array(items) => items,
            other => vec![other],
        };
        if let Some(article) = items.into_iter().find(is_article) {
            return Some(article);
        }
    }
    None
}

/// True when `item` is an object whose `@type` (scalar or list) names an
/// article, compared case-insensitively.
pub fn is_article(item: &Value) -> bool {
    let Some(obj) = item.as_object() else {
        return false;
    };
    let accepted = |t: &str| ARTICLE_TYPES.contains(&t.to_lowercase().as_str());
    match obj.get("@type") {
        Some(Value::String(t)) => accepted(t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(accepted),
        _ => false,
    }
}

/// One author entry: a plain string or an object with `name`/`@id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorEntry {
    Plain(String),
    Entity {
        name: Option<String>,
        id: Option<String>,
    },
}

impl AuthorEntry {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Plain(s.clone())),
            Value::Object(map) => Some(Self::Entity {
                name: str_field(map, "name"),
                id: str_field(map, "@id"),
            }),
            _ => None,
        }
    }

    fn display(&self) -> Option<String> {
        match self {
            Self::Plain(s) => Some(s.clone()),
            Self::Entity { name, id } => name.clone().or_else(|| id.clone()),
        }
    }
}

/// The `author` shapes found in the wild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorShape {
    One(AuthorEntry),
    /// Entries in order, up to the first unsupported element.
    Many(Vec<AuthorEntry>),
}

impl AuthorShape {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::Many(
                items.iter().map_while(AuthorEntry::from_value).collect(),
            )),
            other => AuthorEntry::from_value(other).map(Self::One),
        }
    }

    /// Name, else id, of the single or first author.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::One(entry) => entry.display(),
            Self::Many(entries) => entries.first().and_then(AuthorEntry::display),
        }
    }
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Article fields lifted from a JSON-LD article object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFields {
    pub headline: Option<Value>,
    pub section: Option<Value>,
    pub tags: Option<Value>,
    pub author: Option<String>,
    pub published: Option<Value>,
    pub modified: Option<Value>,
}

impl ArticleFields {
    pub fn from_article(article: &Value) -> Self {
        let Some(obj) = article.as_object() else {
            return Self::default();
        };
        let raw = |key: &str| obj.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            headline: raw("headline"),
            section: raw("articleSection"),
            tags: raw("keywords"),
            author: obj
                .get("author")
                .and_then(AuthorShape::from_value)
                .and_then(|shape| shape.display()),
            published: raw("datePublished"),
            modified: raw("dateModified"),
        }
    }
}
