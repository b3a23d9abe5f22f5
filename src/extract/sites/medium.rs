//! Medium articles

use std::sync::LazyLock;

use regex::Regex;

use super::{SiteContext, TextBuilder, container_text};
use crate::extract::error::ExtractError;
use crate::extract::metadata::{extract_author, extract_published_date, extract_title};

/// Article body must exceed this to beat the generic main-content pass
const MIN_ARTICLE_CHARS: usize = 200;

static CONTAINERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<article\b[^>]*>",
        r#"(?i)<div[^>]*\bclass\s*=\s*["'][^"']*article-content[^"']*["'][^>]*>"#,
        r#"(?i)<div[^>]*\bid\s*=\s*["']root["'][^>]*>"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Medium container pattern should compile"))
    .collect()
});

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let html = ctx.html().await?;

    let body = CONTAINERS
        .iter()
        .find_map(|re| {
            container_text(&html, re, ctx.max_chars())
                .filter(|text| text.chars().count() > MIN_ARTICLE_CHARS)
        })
        .unwrap_or_else(|| ctx.main_content(&html));

    Ok(TextBuilder::new()
        .heading("Medium Article")
        .field("Title", extract_title(&html).as_deref())
        .field("Author", extract_author(&html).as_deref())
        .field("Published", extract_published_date(&html).as_deref())
        .block(body)
        .build())
}
