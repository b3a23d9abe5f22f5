//! GitHub repositories: REST API first, repository page second

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SiteContext, TextBuilder, container_text};
use crate::extract::entities::html_to_text;
use crate::extract::error::ExtractError;
use crate::extract::main_content::truncate_paragraphs;
use crate::extract::metadata::extract_description;

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// Characters kept after "About" when nothing better was found
const ABOUT_WINDOW_CHARS: usize = 1_000;

/// A README container must have more text than this to count
const MIN_README_CHARS: usize = 100;

/// README containers on the repository page, most specific first
static README_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)<article[^>]*\bclass\s*=\s*["'][^"']*markdown-body[^"']*["'][^>]*>"#,
        r#"(?i)<div[^>]*\bdata-testid\s*=\s*["']readme["'][^>]*>"#,
        r#"(?i)<div[^>]*\bid\s*=\s*["']readme["'][^>]*>"#,
        r#"(?i)<div[^>]*\bclass\s*=\s*["'][^"']*markdown-body[^"']*["'][^>]*>"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("README pattern should compile"))
    .collect()
});

#[derive(Debug, Deserialize)]
struct RepoInfo {
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    stargazers_count: Option<u64>,
    language: Option<String>,
}

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let Some((owner, repo)) = repo_slug(ctx) else {
        debug!("{} is not a repository URL", ctx.url);
        return super::run_generic(ctx).await;
    };

    match from_api(ctx, &owner, &repo).await {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("GitHub API failed for {}/{}: {}; using repository page", owner, repo, e);
            from_page(ctx, &owner, &repo).await
        }
    }
}

/// `(owner, repo)` from the first two path segments
fn repo_slug(ctx: &SiteContext<'_>) -> Option<(String, String)> {
    let mut segments = ctx.url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some((owner.to_string(), repo.to_string()))
}

async fn from_api(ctx: &SiteContext<'_>, owner: &str, repo: &str) -> Result<String, ExtractError> {
    let base = ctx.config.github_api_base.trim_end_matches('/');
    let repo_url = format!("{base}/repos/{owner}/{repo}");

    let info_page = ctx.fetcher.get_github_api(&repo_url, ACCEPT_JSON).await?;
    let info: RepoInfo = serde_json::from_slice(&info_page.body)
        .map_err(|e| ExtractError::Parsing(format!("repository metadata: {e}")))?;

    let readme_page = ctx
        .fetcher
        .get_github_api(&format!("{repo_url}/readme"), ACCEPT_RAW)
        .await?;
    let readme = readme_page.text()?;

    let stars = info.stargazers_count.map(|n| n.to_string());
    let topics = (!info.topics.is_empty()).then(|| info.topics.join(", "));

    Ok(TextBuilder::new()
        .field("Repository", Some(&format!("{owner}/{repo}")))
        .field("Description", info.description.as_deref())
        .field("Language", info.language.as_deref())
        .field("Stars", stars.as_deref())
        .field("Topics", topics.as_deref())
        .block(format!(
            "README:\n\n{}",
            truncate_paragraphs(readme.trim(), ctx.max_chars())
        ))
        .build())
}

async fn from_page(ctx: &SiteContext<'_>, owner: &str, repo: &str) -> Result<String, ExtractError> {
    let html = ctx.html().await?;
    let header = TextBuilder::new().field("Repository", Some(&format!("{owner}/{repo}")));

    let readme = README_PATTERNS.iter().find_map(|re| {
        container_text(&html, re, ctx.max_chars())
            .filter(|text| text.chars().count() > MIN_README_CHARS)
    });
    if let Some(readme) = readme {
        return Ok(header
            .field("Description", extract_description(&html).as_deref())
            .block(format!("README:\n\n{readme}"))
            .build());
    }

    let content = ctx.main_content(&html);
    if !content.is_empty() {
        return Ok(header.block(content).build());
    }

    about_window(&html)
        .map(|about| header.block(about).build())
        .ok_or_else(|| ExtractError::Parsing(format!("no readable content for {owner}/{repo}")))
}

/// Text starting at the first "About" on the page
fn about_window(html: &str) -> Option<String> {
    let text = html_to_text(html);
    let start = text.find("About")?;
    Some(text[start..].chars().take(ABOUT_WINDOW_CHARS).collect())
}
