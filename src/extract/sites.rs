//! Site-specific extraction strategies
//!
//! Each strategy turns one URL into an LLM-ready text blob. They share a
//! per-call [`SiteContext`] that fetches the requested URL at most once, so a
//! strategy that gives up can hand over to the generic path without a second
//! round trip.

mod arxiv;
mod generic;
mod github;
mod medium;
mod profiles;
mod stackoverflow;
mod wikipedia;
mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::extract::config::ExtractorConfig;
use crate::extract::error::ExtractError;
use crate::extract::fetch::{FetchClient, FetchedPage};
use crate::extract::main_content::{clean_fragment, extract_main_content};
use crate::extract::pdf::{PdfTextExtractor, pdf_to_text};
use crate::extract::router::Strategy;

pub(crate) use arxiv::arxiv_pdf_failure;

/// Everything a strategy needs for one extraction call
pub(crate) struct SiteContext<'a> {
    pub(crate) fetcher: &'a FetchClient,
    pub(crate) config: &'a ExtractorConfig,
    pub(crate) pdf: &'a dyn PdfTextExtractor,
    pub(crate) url: &'a Url,
    primary: OnceCell<Result<FetchedPage, ExtractError>>,
}

impl<'a> SiteContext<'a> {
    pub(crate) fn new(
        fetcher: &'a FetchClient,
        config: &'a ExtractorConfig,
        pdf: &'a dyn PdfTextExtractor,
        url: &'a Url,
    ) -> Self {
        Self {
            fetcher,
            config,
            pdf,
            url,
            primary: OnceCell::new(),
        }
    }

    /// Seed the context with a page the caller already fetched
    pub(crate) fn with_page(mut self, page: FetchedPage) -> Self {
        self.primary = OnceCell::new_with(Some(Ok(page)));
        self
    }

    /// The requested URL's response, fetched on first use. Failures are
    /// remembered too; nothing is retried.
    pub(crate) async fn page(&self) -> Result<&FetchedPage, ExtractError> {
        self.primary
            .get_or_init(|| self.fetcher.get(self.url.as_str()))
            .await
            .as_ref()
            .map_err(|e| e.clone())
    }

    /// The requested URL decoded as text
    pub(crate) async fn html(&self) -> Result<String, ExtractError> {
        self.page().await?.text()
    }

    pub(crate) fn max_chars(&self) -> usize {
        self.config.max_content_chars
    }

    pub(crate) fn main_content(&self, html: &str) -> String {
        extract_main_content(html, self.max_chars())
    }

    /// PDF text of the requested URL
    pub(crate) async fn pdf_text(&self) -> Result<String, ExtractError> {
        let page = self.page().await?;
        pdf_to_text(self.pdf, &page.body)
    }
}

/// Run the strategy for `strategy`, without the generic fallback.
pub(crate) async fn run(strategy: Strategy, ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    debug!("Running {} strategy for {}", strategy, ctx.url);
    match strategy {
        Strategy::Arxiv => arxiv::extract(ctx).await,
        Strategy::GitHub => github::extract(ctx).await,
        Strategy::Medium => medium::extract(ctx).await,
        Strategy::StackOverflow => stackoverflow::extract(ctx).await,
        Strategy::YouTube => youtube::extract(ctx).await,
        Strategy::Wikipedia => wikipedia::extract(ctx).await,
        Strategy::Twitter
        | Strategy::LinkedIn
        | Strategy::ProductHunt
        | Strategy::Reddit
        | Strategy::Substack
        | Strategy::Notion
        | Strategy::GoogleDocs => profiles::extract(strategy, ctx).await,
        Strategy::Generic => generic::extract(ctx).await,
    }
}

/// Generic web extraction: title, description and main content.
pub(crate) async fn run_generic(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    generic::extract(ctx).await
}

/// Any opening or closing tag: `(/)name ... (/)>`
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*?(/?)>").expect("TAG_RE should compile")
});

/// Markup inside the first element whose opening tag matches `open`, up to
/// its balanced closing tag. An element that is never closed runs to the end
/// of the document.
pub(crate) fn element_inner<'h>(html: &'h str, open: &Regex) -> Option<&'h str> {
    let start = open.find(html)?;
    let name = tag_name(start.as_str())?;
    let body = &html[start.end()..];

    let mut depth = 0usize;
    for caps in TAG_RE.captures_iter(body) {
        let (Some(tag), Some(whole)) = (caps.get(2), caps.get(0)) else {
            continue;
        };
        if !tag.as_str().eq_ignore_ascii_case(name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.is_empty());
        if closing {
            if depth == 0 {
                return Some(&body[..whole.start()]);
            }
            depth -= 1;
        } else if !self_closing {
            depth += 1;
        }
    }
    Some(body)
}

fn tag_name(open_tag: &str) -> Option<&str> {
    let rest = open_tag.strip_prefix('<')?;
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Cleaned text of the element opened by `open`, if non-empty
pub(crate) fn container_text(html: &str, open: &Regex, max_chars: usize) -> Option<String> {
    element_inner(html, open)
        .map(|inner| clean_fragment(inner, max_chars))
        .filter(|text| !text.is_empty())
}

/// Assembles strategy output: labelled field lines grouped into blocks,
/// blocks separated by a blank line.
#[derive(Debug, Default)]
pub(crate) struct TextBuilder {
    blocks: Vec<String>,
    fields: Vec<String>,
    has_body: bool,
}

impl TextBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A fixed heading such as "Medium Article"
    pub(crate) fn heading(mut self, label: &str) -> Self {
        self.flush_fields();
        self.blocks.push(label.to_string());
        self
    }

    /// `Name: value` line, skipped when the value is missing or blank
    pub(crate) fn field(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.fields.push(format!("{name}: {value}"));
        }
        self
    }

    /// `Name: value` as a block of its own, skipped when blank
    pub(crate) fn labelled_block(self, name: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.block(format!("{name}: {value}")),
            None => self,
        }
    }

    /// Free-standing block of body text, skipped when blank
    pub(crate) fn block(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref().trim();
        if !text.is_empty() {
            self.flush_fields();
            self.blocks.push(text.to_string());
            self.has_body = true;
        }
        self
    }

    /// Block introduced by `title:` on its own line, skipped when blank
    pub(crate) fn section(self, title: &str, text: Option<&str>) -> Self {
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => self.block(format!("{title}:\n{text}")),
            None => self,
        }
    }

    /// Whether anything beyond the heading was added
    pub(crate) fn is_empty(&self) -> bool {
        !self.has_body && self.fields.is_empty() && self.blocks.len() <= 1
    }

    pub(crate) fn build(mut self) -> String {
        self.flush_fields();
        self.blocks.join("\n\n")
    }

    fn flush_fields(&mut self) {
        if !self.fields.is_empty() {
            self.blocks.push(self.fields.join("\n"));
            self.fields.clear();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_builder_layout() {
        let text = TextBuilder::new()
            .heading("Medium Article")
            .field("Title", Some("Hello"))
            .field("Author", None)
            .field("Published", Some("2024-01-01"))
            .block("Body text")
            .section("Abstract", Some("Summary"))
            .section("Missing", Some("   "))
            .build();
        assert_eq!(
            text,
            "Medium Article\n\nTitle: Hello\nPublished: 2024-01-01\n\nBody text\n\nAbstract:\nSummary"
        );
    }

    fn opening(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_element_inner_balances_nested_tags() {
        let html = r#"<div id="a"><div class="x"><div>deep</div></div><p>tail</p></div><div id="footer">footer</div>"#;
        let open = opening(r#"<div[^>]*id="a"[^>]*>"#);
        assert_eq!(
            element_inner(html, &open),
            Some(r#"<div class="x"><div>deep</div></div><p>tail</p>"#)
        );
    }

    #[test]
    fn test_element_inner_edge_cases() {
        let open = opening(r"(?i)<div[^>]*>");
        assert_eq!(element_inner("<DIV>upper</Div> after", &open), Some("upper"));
        assert_eq!(element_inner("<div>a<div/>b</div>", &open), Some("a<div/>b"));
        assert_eq!(
            element_inner("<div>never closed <div>x</div>", &open),
            Some("never closed <div>x</div>")
        );
        assert_eq!(element_inner("<p>no divs</p>", &open), None);
        // Other tags with a common prefix are not counted.
        assert_eq!(element_inner("<div><divider></div>", &open), Some("<divider>"));
    }

    #[test]
    fn test_text_builder_empty() {
        let builder = TextBuilder::new().heading("Label").field("Title", None).block("  ");
        assert!(builder.is_empty());
        let builder = TextBuilder::new().heading("Label").field("Title", Some("T"));
        assert!(!builder.is_empty());
    }
}
