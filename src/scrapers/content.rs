//! Main-content handling for article pages.
//!
//! The main block is chosen from a fixed priority list of selectors, falling
//! back to `<body>`. Noise elements (`script`, `style`, `nav`, `footer`,
//! `aside`) are never mutated out of the parsed document; instead every
//! traversal here skips their subtrees, which yields a filtered view of the
//! block for text, markup, links, and images alike.

use std::fmt::Write;

use itertools::{Either, Itertools};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::models::{ImageRef, LinkRef};

/// Elements whose subtrees are excluded from the content view.
pub const NOISE_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "aside"];

const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

static MAIN_BLOCK_CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "div.entry-content", "div.post-content", "div#content"]
        .iter()
        .map(|css| Selector::parse(css).unwrap())
        .collect()
});
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

fn is_noise(name: &str) -> bool {
    NOISE_TAGS.contains(&name)
}

/// Pick the main content block: first present candidate, else `<body>`.
pub fn select_main_block(doc: &Html) -> ElementRef<'_> {
    MAIN_BLOCK_CANDIDATES
        .iter()
        .find_map(|sel| doc.select(sel).next())
        .or_else(|| doc.select(&BODY).next())
        .unwrap_or_else(|| doc.root_element())
}

/// Non-noise text pieces under `node`, each trimmed, empty ones dropped.
fn text_pieces<'a>(node: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let piece = text.trim();
                if !piece.is_empty() {
                    out.push(piece);
                }
            }
            Node::Element(el) if !is_noise(el.name()) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    text_pieces(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Visible text of a block, one text node per line.
pub fn block_text(block: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    text_pieces(block, &mut pieces);
    pieces.join("\n")
}

/// Visible text of an inline element, pieces concatenated.
pub fn inline_text(el: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    text_pieces(el, &mut pieces);
    pieces.concat()
}

/// All non-noise descendant elements of `block`, in document order.
pub fn content_elements(block: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<ElementRef<'_>> = block.children().rev().filter_map(ElementRef::wrap).collect();
    while let Some(el) = stack.pop() {
        if is_noise(el.value().name()) {
            continue;
        }
        out.push(el);
        stack.extend(el.children().rev().filter_map(ElementRef::wrap));
    }
    out
}

/// Serialize `block` with noise subtrees left out.
pub fn render_filtered(block: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_element(block, &mut out);
    out
}

fn render_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if is_noise(name) {
        return;
    }
    out.push('<');
    out.push_str(name);
    for (attr, value) in el.value().attrs() {
        let _ = write!(out, " {}=\"{}\"", attr, escape_attr(value));
    }
    out.push('>');
    if VOID_TAGS.contains(&name) {
        return;
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Comment(comment) => {
                let _ = write!(out, "<!--{}-->", &**comment);
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_element(child_el, out);
                }
            }
            _ => {}
        }
    }
    let _ = write!(out, "</{name}>");
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Anchors inside the block, split into (internal, external).
///
/// A link is internal when its resolved host contains the article's host.
pub fn collect_links(block: ElementRef<'_>, base: &Url) -> (Vec<LinkRef>, Vec<LinkRef>) {
    let base_host = base.host_str().unwrap_or("");
    content_elements(block)
        .into_iter()
        .filter(|el| el.value().name() == "a")
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let resolved = base.join(href).ok()?;
            let text = Some(inline_text(el)).filter(|t| !t.is_empty());
            Some((resolved, text))
        })
        .partition_map(|(resolved, text)| {
            let internal = resolved.host_str().unwrap_or("").contains(base_host);
            let link = LinkRef {
                href: resolved.to_string(),
                text,
            };
            if internal {
                Either::Left(link)
            } else {
                Either::Right(link)
            }
        })
}

/// Images inside the block, resolved, without inline payloads yet.
pub fn collect_images(block: ElementRef<'_>, base: &Url) -> Vec<ImageRef> {
    content_elements(block)
        .into_iter()
        .filter(|el| el.value().name() == "img")
        .filter_map(|el| {
            let src = base.join(el.value().attr("src")?).ok()?;
            let alt = el
                .value()
                .attr("alt")
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from);
            Some(ImageRef {
                src: src.to_string(),
                alt,
                base64: None,
            })
        })
        .collect()
}

/// MIME type guessed from the image URL's path extension.
pub fn image_mime(src: &str) -> &'static str {
    let path = Url::parse(src)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| src.to_lowercase());
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}
