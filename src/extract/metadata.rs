//! Metadata extraction from raw HTML.
//!
//! Every field is looked up independently with case-insensitive pattern
//! matching over the markup. Missing or malformed markup yields `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::extract::entities::{decode_html_entities, html_to_text};

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("META_TAG_RE should compile"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("ATTR_RE should compile")
});
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("TITLE_RE should compile")
});
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("H1_RE should compile"));
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("JSON_LD_RE should compile")
});
static LD_AUTHOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)"author"\s*:\s*\[?\s*\{[^}]*?"name"\s*:\s*"([^"]+)""#)
        .expect("LD_AUTHOR_NAME_RE should compile")
});
static LD_AUTHOR_STR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"author"\s*:\s*"([^"]+)""#).expect("LD_AUTHOR_STR_RE should compile")
});
static LD_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"datePublished"\s*:\s*"([^"]+)""#).expect("LD_DATE_RE should compile")
});

/// Longest `<h1>` text accepted as a title fallback
const MAX_H1_TITLE_CHARS: usize = 200;

/// Fields recovered from a page's markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_type: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub keywords: Vec<String>,
}

/// Which attribute names the `<meta>` key
#[derive(Debug, Clone, Copy)]
enum MetaKey<'a> {
    Property(&'a str),
    Name(&'a str),
    /// `property` or `name`, used for `twitter:*` which sites spell both ways
    Either(&'a str),
}

/// Run every field extractor over `html`.
pub fn extract_page_meta(html: &str) -> PageMeta {
    PageMeta {
        title: extract_title(html),
        description: extract_description(html),
        og_title: meta_content(html, MetaKey::Property("og:title")),
        og_description: meta_content(html, MetaKey::Property("og:description")),
        og_type: meta_content(html, MetaKey::Property("og:type")),
        author: extract_author(html),
        published_date: extract_published_date(html),
        keywords: extract_keywords(html),
    }
}

/// `og:title`, then `twitter:title`, then `<title>`, then a short `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    meta_content(html, MetaKey::Property("og:title"))
        .or_else(|| meta_content(html, MetaKey::Either("twitter:title")))
        .or_else(|| title_tag(html))
        .or_else(|| first_heading(html))
}

/// `og:description`, then `twitter:description`, then `<meta name="description">`.
pub fn extract_description(html: &str) -> Option<String> {
    meta_content(html, MetaKey::Property("og:description"))
        .or_else(|| meta_content(html, MetaKey::Either("twitter:description")))
        .or_else(|| meta_content(html, MetaKey::Name("description")))
}

pub fn extract_author(html: &str) -> Option<String> {
    meta_content(html, MetaKey::Property("article:author"))
        .or_else(|| meta_content(html, MetaKey::Name("author")))
        .or_else(|| meta_content(html, MetaKey::Name("article:author")))
        .or_else(|| json_ld_author(html))
}

/// Published date exactly as the page wrote it; no date parsing happens here.
pub fn extract_published_date(html: &str) -> Option<String> {
    meta_content(html, MetaKey::Property("article:published_time"))
        .or_else(|| meta_content(html, MetaKey::Name("date")))
        .or_else(|| meta_content(html, MetaKey::Name("pubdate")))
        .or_else(|| json_ld_date(html))
}

/// Comma-split `keywords` meta plus the `article:tag` value as one extra entry.
pub fn extract_keywords(html: &str) -> Vec<String> {
    let mut keywords: Vec<String> = meta_content(html, MetaKey::Name("keywords"))
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(tag) = meta_content(html, MetaKey::Property("article:tag")) {
        keywords.push(tag);
    }
    keywords
}

fn meta_content(html: &str, key: MetaKey<'_>) -> Option<String> {
    for tag in META_TAG_RE.find_iter(html) {
        let mut property = None;
        let mut name = None;
        let mut content = None;

        for caps in ATTR_RE.captures_iter(tag.as_str()) {
            let Some(attr) = caps.get(1) else {
                continue;
            };
            let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
                continue;
            };
            match attr.as_str().to_ascii_lowercase().as_str() {
                "property" => property = Some(value.as_str()),
                "name" => name = Some(value.as_str()),
                "content" => content = Some(value.as_str()),
                _ => {}
            }
        }

        let matches = |attr: Option<&str>, wanted: &str| {
            attr.is_some_and(|value| value.trim().eq_ignore_ascii_case(wanted))
        };
        let matched = match key {
            MetaKey::Property(wanted) => matches(property, wanted),
            MetaKey::Name(wanted) => matches(name, wanted),
            MetaKey::Either(wanted) => matches(property, wanted) || matches(name, wanted),
        };
        if !matched {
            continue;
        }

        let value = decode_html_entities(content.unwrap_or_default().trim());
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn title_tag(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()))
        .filter(|title| !title.is_empty())
}

fn first_heading(html: &str) -> Option<String> {
    H1_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()))
        .find(|text| !text.is_empty() && text.chars().count() < MAX_H1_TITLE_CHARS)
}

fn json_ld_blocks(html: &str) -> impl Iterator<Item = &str> {
    JSON_LD_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Flatten top-level arrays and `@graph` containers into individual nodes.
fn json_ld_nodes(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(json_ld_nodes).collect(),
        Value::Object(map) => {
            let mut nodes = vec![value];
            if let Some(graph) = map.get("@graph") {
                nodes.extend(json_ld_nodes(graph));
            }
            nodes
        }
        _ => Vec::new(),
    }
}

fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}

fn json_ld_author(html: &str) -> Option<String> {
    json_ld_field(
        html,
        |node| node.get("author").and_then(author_name),
        |raw| {
            LD_AUTHOR_NAME_RE
                .captures(raw)
                .or_else(|| LD_AUTHOR_STR_RE.captures(raw))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        },
    )
}

fn json_ld_date(html: &str) -> Option<String> {
    json_ld_field(
        html,
        |node| {
            node.get("datePublished")
                .or_else(|| node.get("datepublished"))
                .and_then(Value::as_str)
                .map(str::to_string)
        },
        |raw| {
            LD_DATE_RE
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        },
    )
}

/// Look a field up in each JSON-LD block, scanning the raw text when a block
/// is not valid JSON.
fn json_ld_field(
    html: &str,
    from_node: impl Fn(&Value) -> Option<String>,
    from_raw: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    json_ld_blocks(html)
        .find_map(|raw| match serde_json::from_str::<Value>(raw) {
            Ok(value) => json_ld_nodes(&value).into_iter().find_map(&from_node),
            Err(_) => from_raw(raw),
        })
        .map(|value| decode_html_entities(value.trim()))
        .filter(|value| !value.is_empty())
}
