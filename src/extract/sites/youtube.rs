//! YouTube watch pages

use std::sync::LazyLock;

use regex::Regex;

use super::{SiteContext, TextBuilder};
use crate::extract::entities::decode_html_entities;
use crate::extract::error::ExtractError;
use crate::extract::metadata::{extract_author, extract_description, extract_title};

static AUTHOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""author"\s*:\s*\{\s*"name"\s*:\s*"([^"]+)""#)
        .expect("AUTHOR_NAME_RE should compile")
});
static OWNER_CHANNEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""ownerChannelName"\s*:\s*"([^"]+)""#).expect("OWNER_CHANNEL_RE should compile")
});

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let html = ctx.html().await?;

    Ok(TextBuilder::new()
        .heading("YouTube Video")
        .field("Title", extract_title(&html).as_deref())
        .field("Channel", channel_name(&html).as_deref())
        .section("Description", extract_description(&html).as_deref())
        .block(ctx.main_content(&html))
        .build())
}

/// Channel name from the embedded player JSON, then the author meta tag
fn channel_name(html: &str) -> Option<String> {
    [&*AUTHOR_NAME_RE, &*OWNER_CHANNEL_RE]
        .iter()
        .find_map(|re| re.captures(html).and_then(|caps| caps.get(1)))
        .map(|m| decode_html_entities(m.as_str()))
        .or_else(|| extract_author(html))
}
