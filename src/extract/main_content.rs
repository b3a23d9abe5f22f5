//! Readable body text extraction
//!
//! Strips scripts and page furniture from raw HTML, picks the primary content
//! region and reduces it to bounded plain-text paragraphs. Nothing here fails:
//! an empty string means the page had no usable content.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::entities::{decode_html_entities, strip_tags};

/// Default output budget in characters, before the ellipsis
pub const DEFAULT_MAX_CHARS: usize = 15_000;

/// Suffix appended when the output is cut to the budget
pub const TRUNCATION_MARKER: &str = "...";

/// A candidate region must be longer than this to be used
const MIN_REGION_CHARS: usize = 100;
const MIN_LINE_CHARS: usize = 10;
const MIN_PARAGRAPH_CHARS: usize = 20;

const NAVIGATION_LINES: &[&str] = &["home", "menu", "search"];

const BOILERPLATE_PHRASES: &[&str] = &[
    "accept all cookies",
    "accept cookies",
    "we use cookies",
    "this website uses cookies",
    "cookie policy",
    "cookie settings",
    "manage cookies",
    "skip to main content",
    "skip to content",
    "skip to navigation",
    "subscribe to our newsletter",
    "subscribe to newsletter",
    "sign up for our newsletter",
    "advertisement",
    "sponsored content",
    "loading...",
    "please wait...",
    "please enable javascript",
    "javascript is disabled",
    "share this article",
    "follow us on",
];

static NOISE_BLOCKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>|<noscript\b[^>]*>.*?</noscript>|<svg\b[^>]*>.*?</svg>",
    )
    .expect("NOISE_BLOCKS_RE should compile")
});

/// Elements that may carry an article/content class or id
const REGION_ELEMENTS: &str = "div|section|main|aside|span|td|p|ul|ol|li|figure|header";

/// Content regions in preference order; greedy so the widest span wins.
static CONTENT_REGIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let attr_region = |attr: &str, word: &str| {
        format!(
            r#"(?is)<(?:{REGION_ELEMENTS})\b[^>]*\b{attr}\s*=\s*["'][^"']*{word}[^"']*["'][^>]*>.*</(?:{REGION_ELEMENTS})>"#
        )
    };
    [
        r"(?is)<article\b[^>]*>.*</article>".to_string(),
        r"(?is)<main\b[^>]*>.*</main>".to_string(),
        attr_region("class", "article"),
        attr_region("class", "content"),
        attr_region("id", "content"),
        r"(?is)<body\b[^>]*>.*</body>".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("content region pattern should compile"))
    .collect()
});

static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = BOILERPLATE_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternatives}")).expect("BOILERPLATE_RE should compile")
});

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("HORIZONTAL_SPACE should compile"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_LINES should compile"));

/// Extract the readable body of an HTML document, bounded to `max_chars`.
pub fn extract_main_content(html: &str, max_chars: usize) -> String {
    let cleaned = NOISE_BLOCKS_RE.replace_all(html, "");
    let region = primary_region(&cleaned).unwrap_or(&cleaned);
    clean_fragment(region, max_chars)
}

/// First content region whose match is long enough to be the page body.
fn primary_region(html: &str) -> Option<&str> {
    CONTENT_REGIONS.iter().find_map(|re| {
        re.find(html)
            .map(|m| m.as_str())
            .filter(|region| region.chars().count() > MIN_REGION_CHARS)
    })
}

/// Reduce an HTML fragment to filtered, bounded paragraphs without choosing a
/// region first. Site extractors use this on containers they located.
pub fn clean_fragment(html: &str, max_chars: usize) -> String {
    let text = decode_html_entities(&strip_tags(html));
    let text = BOILERPLATE_RE.replace_all(&text, "");

    let lines: Vec<String> = text
        .lines()
        .map(|line| HORIZONTAL_SPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| line.is_empty() || is_content_line(line))
        .collect();

    let joined = lines.join("\n");
    let collapsed = BLANK_LINES.replace_all(&joined, "\n\n");

    let paragraphs: Vec<&str> = collapsed
        .trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| paragraph.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect();

    truncate_paragraphs(&paragraphs.join("\n\n"), max_chars)
}

fn is_content_line(line: &str) -> bool {
    line.chars().count() >= MIN_LINE_CHARS
        && !NAVIGATION_LINES
            .iter()
            .any(|nav| line.eq_ignore_ascii_case(nav))
}

/// Keep whole paragraphs up to `max_chars`, then append the marker.
///
/// Falls back to a hard character cut when not even the first paragraph fits.
pub(crate) fn truncate_paragraphs(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for paragraph in text.split("\n\n") {
        let separator = if out.is_empty() { 0 } else { 2 };
        let len = paragraph.chars().count();
        if used + separator + len > max_chars {
            break;
        }
        if separator > 0 {
            out.push_str("\n\n");
        }
        out.push_str(paragraph);
        used += separator + len;
    }

    if out.is_empty() {
        out = text.chars().take(max_chars).collect();
    }
    out.push_str(TRUNCATION_MARKER);
    out
}
