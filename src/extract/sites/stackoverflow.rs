//! Stack Overflow questions: question body plus the first answer

use std::sync::LazyLock;

use regex::Regex;

use super::{SiteContext, TextBuilder, container_text};
use crate::extract::error::ExtractError;
use crate::extract::metadata::extract_title;

static PROSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div[^>]*\bclass\s*=\s*["'][^"']*\bs-prose\b[^"']*["'][^>]*>"#)
        .expect("PROSE_RE should compile")
});
static QUESTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div[^>]*\bid\s*=\s*["']question-header["'][^>]*>"#)
        .expect("QUESTION_HEADER_RE should compile")
});
static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*class\s*=\s*["'](?:answer|[^"']*\sanswer)(?:\s[^"']*)?["']"#)
        .expect("ANSWER_RE should compile")
});

pub(crate) async fn extract(ctx: &SiteContext<'_>) -> Result<String, ExtractError> {
    let html = ctx.html().await?;
    let max_chars = ctx.max_chars();

    // Everything before the first answer belongs to the question.
    let (question_html, answers_html) = match ANSWER_RE.find(&html) {
        Some(m) => (&html[..m.start()], Some(&html[m.start()..])),
        None => (html.as_str(), None),
    };

    let question = container_text(question_html, &PROSE_RE, max_chars)
        .or_else(|| container_text(question_html, &QUESTION_HEADER_RE, max_chars));
    let answer = answers_html.and_then(|answers| container_text(answers, &PROSE_RE, max_chars));

    let builder = TextBuilder::new()
        .heading("Stack Overflow Question")
        .field("Title", extract_title(&html).as_deref());

    let builder = if question.is_none() && answer.is_none() {
        builder.block(ctx.main_content(&html))
    } else {
        builder
            .section("Question", question.as_deref())
            .section("Top Answer", answer.as_deref())
    };
    Ok(builder.build())
}
