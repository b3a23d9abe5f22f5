//! Generic web extraction, also the fallback for every other strategy

use tracing::debug;

use super::{SiteContext, TextBuilder};
use crate::extract::error::ExtractError;
use crate::extract::fetch::FetchedPage;
use crate::extract::main_content::extract_main_content;
use crate::extract::metadata::{extract_description, extract_title};
use crate::extract::pdf::{PdfTextExtractor, pdf_to_text};

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let page = ctx.page().await?;
    render_page(page, ctx.pdf, ctx.max_chars())
}

/// Branch on the fetched content type: PDF text, HTML extraction, or the
/// decoded body verbatim for anything else (JSON, plain text, XML).
pub(crate) fn render_page(
    page: &FetchedPage,
    pdf: &dyn PdfTextExtractor,
    max_chars: usize,
) -> Result<String, ExtractError> {
    if page.is_pdf() {
        return pdf_to_text(pdf, &page.body);
    }

    let text = page.text()?;
    if !page.is_html() {
        debug!("Returning {} body verbatim", page.content_type);
        return Ok(text);
    }
    Ok(render_html(&text, max_chars))
}

/// Title and description header over the main content; the raw markup when
/// no main content survives.
pub(crate) fn render_html(html: &str, max_chars: usize) -> String {
    let content = extract_main_content(html, max_chars);
    if content.is_empty() {
        return html.to_string();
    }

    TextBuilder::new()
        .field("Title", extract_title(html).as_deref())
        .field("Description", extract_description(html).as_deref())
        .block(content)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::pdf::PdfExtractBackend;
    use crate::extract::sites::test_support::prose;

    fn page(content_type: &str, body: &str) -> FetchedPage {
        FetchedPage {
            url: "https://example.com/".to_string(),
            status: 200,
            content_type: content_type.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_html_gets_header_and_body() {
        let body = prose(300);
        let html = format!(
            r#"<html><head><title>Page Title</title>
            <meta name="description" content="A short summary"></head>
            <body><article><p>{body}</p></article></body></html>"#
        );
        let text = render_page(&page("text/html", &html), &PdfExtractBackend, 15_000).unwrap();
        assert!(text.starts_with("Title: Page Title\nDescription: A short summary\n\nThe quick brown fox"));
    }

    #[test]
    fn test_json_returned_verbatim() {
        let json = r#"{"items": [1, 2, 3], "html": "<b>not stripped</b>"}"#;
        let text = render_page(&page("application/json", json), &PdfExtractBackend, 15_000).unwrap();
        assert_eq!(text, json);
    }

    #[test]
    fn test_empty_extraction_returns_raw_html() {
        let html = "<html><body><div>hi</div></body></html>";
        let text = render_page(&page("text/html", html), &PdfExtractBackend, 15_000).unwrap();
        assert_eq!(text, html);
    }

    #[test]
    fn test_unreadable_pdf_is_failure() {
        let result = render_page(&page("application/pdf", "%PDF-1.4 junk"), &PdfExtractBackend, 15_000);
        assert_eq!(result, Err(ExtractError::PdfExtractionFailed));
    }
}
