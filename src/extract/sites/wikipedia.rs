//! Wikipedia articles

use std::sync::LazyLock;

use regex::Regex;

use super::{SiteContext, TextBuilder, container_text};
use crate::extract::error::ExtractError;
use crate::extract::metadata::extract_title;

static CONTENT_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div[^>]*\bid\s*=\s*["']mw-content-text["'][^>]*>"#)
        .expect("CONTENT_TEXT_RE should compile")
});

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let html = ctx.html().await?;
    let body = container_text(&html, &CONTENT_TEXT_RE, ctx.max_chars())
        .unwrap_or_else(|| ctx.main_content(&html));

    Ok(TextBuilder::new()
        .heading("Wikipedia Article")
        .field("Title", extract_title(&html).as_deref())
        .block(body)
        .build())
}
