//! HTML entity decoding and shared text cleanup helpers.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(nbsp|amp|lt|gt|quot|apos|#39|#x27);").expect("ENTITY_RE should compile")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("TAG_RE should compile"));
static ANY_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("ANY_WHITESPACE should compile"));

/// Decode the core HTML entities in a single pass.
///
/// The replacement output is never rescanned, so `&amp;amp;` becomes `&amp;`.
/// Entities outside the core set are left as written.
pub fn decode_html_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY_RE
        .replace_all(s, |caps: &Captures<'_>| match &caps[1] {
            "nbsp" => " ",
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            _ => "'",
        })
        .into_owned()
}

/// Replace every tag with a single space.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, " ").into_owned()
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    ANY_WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Strip tags, decode entities and flatten whitespace into one line of text.
pub fn html_to_text(html: &str) -> String {
    collapse_whitespace(&decode_html_entities(&strip_tags(html)))
}
