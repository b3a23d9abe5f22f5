//! arXiv papers: abstract-page fields, or the PDF for `/pdf/` links

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

use super::{SiteContext, TextBuilder};
use crate::extract::entities::html_to_text;
use crate::extract::error::ExtractError;
use crate::extract::metadata::extract_title;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h1[^>]*class\s*=\s*["'][^"']*\btitle\b[^"']*["'][^>]*>(.*?)</h1>"#)
        .expect("arxiv TITLE_RE should compile")
});
static AUTHORS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*class\s*=\s*["'][^"']*\bauthors\b[^"']*["'][^>]*>(.*?)</div>"#)
        .expect("arxiv AUTHORS_RE should compile")
});
static ABSTRACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<blockquote[^>]*class\s*=\s*["'][^"']*\babstract\b[^"']*["'][^>]*>(.*?)</blockquote>"#,
    )
    .expect("arxiv ABSTRACT_RE should compile")
});

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    if let Some(paper_id) = pdf_paper_id(ctx.url) {
        return extract_pdf(ctx, &paper_id).await;
    }

    let html = ctx.html().await?;
    let title = labelled_text(&html, &TITLE_RE, "Title:").or_else(|| extract_title(&html));
    let authors = labelled_text(&html, &AUTHORS_RE, "Authors:");
    let summary = labelled_text(&html, &ABSTRACT_RE, "Abstract:");

    Ok(TextBuilder::new()
        .labelled_block("Title", title.as_deref())
        .labelled_block("Authors", authors.as_deref())
        .section("Abstract", summary.as_deref())
        .block(ctx.main_content(&html))
        .build())
}

async fn extract_pdf(ctx: &SiteContext<'_>, paper_id: &str) -> Result<String, ExtractError> {
    // Fetch failures propagate as-is; only an unreadable PDF gets the redirect.
    ctx.page().await?;
    ctx.pdf_text().await.map_err(|e| {
        warn!("arXiv PDF {} has no extractable text: {}", paper_id, e);
        ExtractError::ArxivPdfNotExtractable {
            suggested_url: abstract_url(paper_id),
        }
    })
}

/// The abstract-page redirect error for an arXiv `/pdf/` URL
pub(crate) fn arxiv_pdf_failure(url: &Url) -> Option<ExtractError> {
    pdf_paper_id(url).map(|id| ExtractError::ArxivPdfNotExtractable {
        suggested_url: abstract_url(&id),
    })
}

/// Paper id for `/pdf/<id>` and `/pdf/<id>.pdf` links
fn pdf_paper_id(url: &Url) -> Option<String> {
    if !url.path().starts_with("/pdf/") {
        return None;
    }
    let last = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let id = match last.len().checked_sub(4) {
        Some(cut) if last[cut..].eq_ignore_ascii_case(".pdf") => &last[..cut],
        _ => last,
    };
    (!id.is_empty() && id != "pdf").then(|| id.to_string())
}

fn abstract_url(paper_id: &str) -> String {
    format!("https://arxiv.org/abs/{paper_id}")
}

/// Text of the first capture, minus the descriptor label arXiv puts inside
fn labelled_text(html: &str, re: &Regex, label: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()).replace(" ,", ","))
        .map(|text| text.strip_prefix(label).map(str::trim).unwrap_or(&text).to_string())
        .filter(|text| !text.is_empty())
}
