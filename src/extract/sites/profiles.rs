//! Social and document platforms that share one layout: a heading, the page
//! metadata they expose, then whatever main content survives.

use super::{SiteContext, TextBuilder};
use crate::extract::error::ExtractError;
use crate::extract::metadata::{
    extract_author, extract_description, extract_published_date, extract_title,
};
use crate::extract::router::Strategy;

/// Per-platform heading and which optional fields the platform exposes
#[derive(Debug, Clone, Copy)]
struct Profile {
    heading: &'static str,
    author: bool,
    published: bool,
}

fn profile(strategy: Strategy) -> Profile {
    let (heading, author, published) = match strategy {
        Strategy::Twitter => ("Twitter/X Post", true, false),
        Strategy::LinkedIn => ("LinkedIn Post", true, false),
        Strategy::Reddit => ("Reddit Post", true, false),
        Strategy::ProductHunt => ("Product Hunt Launch", false, false),
        Strategy::Substack => ("Substack Article", true, true),
        Strategy::Notion => ("Notion Page", false, false),
        Strategy::GoogleDocs => ("Google Doc", false, false),
        _ => ("Web Page", false, false),
    };
    Profile {
        heading,
        author,
        published,
    }
}

pub(crate) async fn extract(
    strategy: Strategy,
    ctx: &SiteContext<'_>,
) -> Result<String, ExtractError> {
    let html = ctx.html().await?;
    let profile = profile(strategy);

    let author = profile.author.then(|| extract_author(&html)).flatten();
    let published = profile
        .published
        .then(|| extract_published_date(&html))
        .flatten();

    let builder = TextBuilder::new()
        .heading(profile.heading)
        .field("Title", extract_title(&html).as_deref())
        .field("Author", author.as_deref())
        .field("Published", published.as_deref())
        .field("Description", extract_description(&html).as_deref())
        .block(ctx.main_content(&html));

    if builder.is_empty() {
        return Err(ExtractError::Parsing(format!(
            "no {} content at {}",
            strategy, ctx.url
        )));
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::sites::test_support::extractor;
    use mockito::Server;
    use url::Url;

    #[tokio::test]
    async fn test_post_uses_open_graph_fields() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/someone/status/1")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<html><head>
                <meta property="og:title" content="Someone on X">
                <meta property="og:description" content="Shipping the new release today">
                <meta name="author" content="Someone">
                </head><body><div id="react-root"></div></body></html>"#,
            )
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = Url::parse(&format!("{}/someone/status/1", server.url())).unwrap();
        let text = extract(Strategy::Twitter, &ex.context(&url)).await.unwrap();

        assert_eq!(
            text,
            "Twitter/X Post\n\nTitle: Someone on X\nAuthor: Someone\nDescription: Shipping the new release today"
        );
    }

    #[tokio::test]
    async fn test_empty_page_is_parsing_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/doc")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><div></div></body></html>")
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = Url::parse(&format!("{}/doc", server.url())).unwrap();
        let err = extract(Strategy::GoogleDocs, &ex.context(&url)).await.unwrap_err();
        assert!(matches!(err, ExtractError::Parsing(_)));
    }

    #[test]
    fn test_profile_headings() {
        assert_eq!(profile(Strategy::ProductHunt).heading, "Product Hunt Launch");
        assert_eq!(profile(Strategy::Notion).heading, "Notion Page");
        assert!(profile(Strategy::Substack).published);
    }
}
