//! The extraction service: routes a URL, runs its strategy, and falls back to
//! generic web extraction when a specialised strategy gives up.

use std::fmt;
use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::extract::config::ExtractorConfig;
use crate::extract::error::ExtractError;
use crate::extract::fetch::FetchClient;
use crate::extract::pdf::{PdfExtractBackend, PdfTextExtractor, pdf_to_text};
use crate::extract::router::{Strategy, classify};
use crate::extract::sites::{self, SiteContext, arxiv_pdf_failure};
use crate::extract::{ContentMetadata, ExtractionResult};

/// Stateless extraction service. Cheap to clone and safe to share across
/// tasks; every call builds its own [`SiteContext`].
#[derive(Clone)]
pub struct ContentExtractor {
    fetcher: FetchClient,
    config: ExtractorConfig,
    pdf: Arc<dyn PdfTextExtractor>,
}

impl fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentExtractor {
    /// Build an extractor with the `pdf-extract` backend
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let fetcher = FetchClient::new(&config)?;
        Ok(Self {
            fetcher,
            config,
            pdf: Arc::new(PdfExtractBackend),
        })
    }

    /// Swap the PDF text backend
    pub fn with_pdf_extractor(mut self, pdf: Arc<dyn PdfTextExtractor>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub(crate) fn context<'a>(&'a self, url: &'a Url) -> SiteContext<'a> {
        SiteContext::new(&self.fetcher, &self.config, self.pdf.as_ref(), url)
    }

    /// Content-only extraction.
    ///
    /// PDF-looking URLs get a text-extraction attempt first; when that yields
    /// nothing the URL continues through host routing like any other page.
    #[instrument(skip(self))]
    pub async fn extract_content(&self, url: &str) -> Result<String, ExtractError> {
        let url = parse_url(url)?;
        let route = classify(&url);
        let ctx = self.context(&url);
        debug!("Routed {} to {} (pdf_first: {})", url, route.strategy, route.pdf_first);

        // arXiv `/pdf/` links are handled by the arXiv strategy so a failure
        // carries the abstract-page suggestion.
        if route.pdf_first && route.strategy != Strategy::Arxiv {
            match ctx.pdf_text().await {
                Ok(text) => return Ok(text),
                Err(e) => debug!("PDF attempt for {} failed: {}; trying web content", url, e),
            }
        }

        self.run_with_fallback(route.strategy, &ctx).await
    }

    /// Content plus metadata, bounded by the overall deadline.
    ///
    /// The in-flight request is dropped when the deadline fires first.
    #[instrument(skip(self))]
    pub async fn extract_content_with_metadata(
        &self,
        url: &str,
    ) -> Result<ExtractionResult, ExtractError> {
        let parsed = parse_url(url)?;
        let secs = self.config.overall_timeout_secs;

        match timeout(self.config.overall_timeout(), self.extract_with_metadata(&parsed)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Extraction of {} exceeded {}s", url, secs);
                Err(ExtractError::Timeout {
                    url: url.to_string(),
                    secs,
                })
            }
        }
    }

    async fn extract_with_metadata(&self, url: &Url) -> Result<ExtractionResult, ExtractError> {
        let route = classify(url);
        let page = self.fetcher.get(url.as_str()).await?;
        let content_type = Some(page.content_type.as_str()).filter(|ct| !ct.is_empty());

        if page.is_pdf() {
            let metadata = ContentMetadata::for_url(url, content_type);
            let content = pdf_to_text(self.pdf.as_ref(), &page.body)
                .map_err(|e| pdf_failure(route.strategy, url, e))?;
            info!("Extracted {} chars of PDF text from {}", content.len(), url);
            return Ok(ExtractionResult { content, metadata });
        }

        if !page.is_html() {
            let metadata = ContentMetadata::for_url(url, content_type);
            let content = page.text()?;
            return Ok(ExtractionResult { content, metadata });
        }

        let html = page.text()?;
        let metadata = ContentMetadata::from_html(url, &html, content_type);
        let ctx = self.context(url).with_page(page);
        let content = self.run_with_fallback(route.strategy, &ctx).await?;
        info!("Extracted {} chars from {} via {}", content.len(), url, route.strategy);

        Ok(ExtractionResult { content, metadata })
    }

    /// Run `strategy`, handing over to generic extraction unless the failure
    /// is terminal.
    async fn run_with_fallback(
        &self,
        strategy: Strategy,
        ctx: &SiteContext<'_>,
    ) -> Result<String, ExtractError> {
        if strategy == Strategy::Generic {
            return sites::run_generic(ctx).await;
        }

        match sites::run(strategy, ctx).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => {
                debug!("{} strategy produced no text for {}", strategy, ctx.url);
                sites::run_generic(ctx).await
            }
            Err(e) if e.is_terminal() => Err(e),
            Err(e) => {
                warn!("{} strategy failed for {}: {}; using generic extraction", strategy, ctx.url, e);
                sites::run_generic(ctx).await
            }
        }
    }
}

/// arXiv `/pdf/` links that yield no text point at the abstract page instead
fn pdf_failure(strategy: Strategy, url: &Url, err: ExtractError) -> ExtractError {
    match strategy {
        Strategy::Arxiv => arxiv_pdf_failure(url).unwrap_or(err),
        _ => err,
    }
}

fn parse_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{other}' in {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::pdf::tests::FixedPages;
    use crate::extract::sites::test_support::{extractor, extractor_with_pdf, prose};
    use mockito::Server;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_json_body_returned_verbatim() {
        let mut server = Server::new_async().await;
        let body = r#"{"id": 7, "note": "<p>kept as-is</p>"}"#;
        let _mock = server
            .mock("GET", "/api/item")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let text = ex
            .extract_content(&format!("{}/api/item", server.url()))
            .await
            .unwrap();
        assert_eq!(text, body);
    }

    #[tokio::test]
    async fn test_metadata_carries_host_and_path() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/blog/2024/post")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(format!(
                r#"<html><head><title>A Post</title>
                <meta name="keywords" content="rust, parsing"></head>
                <body><article><p>{}</p></article></body></html>"#,
                prose(300)
            ))
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = format!("{}/blog/2024/post", server.url());
        let result = ex.extract_content_with_metadata(&url).await.unwrap();

        let expected_host = Url::parse(&url).unwrap().host_str().map(str::to_string);
        assert_eq!(result.metadata.url, url);
        assert_eq!(result.metadata.domain, expected_host);
        assert_eq!(result.metadata.path_components, vec!["blog", "2024", "post"]);
        assert_eq!(result.metadata.title.as_deref(), Some("A Post"));
        assert_eq!(result.metadata.keywords, vec!["rust", "parsing"]);
        assert_eq!(
            result.metadata.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert!(result.content.starts_with("Title: A Post\n\nThe quick brown fox"));
    }

    #[tokio::test]
    async fn test_silent_server_hits_overall_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        });

        let config = ExtractorConfig::builder()
            .request_timeout_secs(5)
            .overall_timeout_secs(1)
            .build();
        let ex = ContentExtractor::new(config).unwrap();
        let started = std::time::Instant::now();
        let err = ex
            .extract_content_with_metadata(&format!("http://{addr}/slow"))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(
            err,
            ExtractError::Timeout {
                url: format!("http://{addr}/slow"),
                secs: 1
            }
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_pdf_url_serving_html_falls_through() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper.pdf")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(format!(
                "<html><head><title>Moved</title></head><body><main><p>{}</p></main></body></html>",
                prose(200)
            ))
            .expect(1)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let text = ex
            .extract_content(&format!("{}/paper.pdf", server.url()))
            .await
            .unwrap();

        assert!(text.starts_with("Title: Moved\n\nThe quick brown fox"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pdf_url_returns_pdf_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/report.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.7 body")
            .create_async()
            .await;

        let ex = extractor_with_pdf(&server.url(), FixedPages(Some(vec!["Summary", "Details"])));
        let url = format!("{}/report.pdf", server.url());
        assert_eq!(ex.extract_content(&url).await.unwrap(), "Summary\n\nDetails");

        let result = ex.extract_content_with_metadata(&url).await.unwrap();
        assert_eq!(result.content, "Summary\n\nDetails");
        assert_eq!(result.metadata.title, None);
        assert_eq!(result.metadata.path_components, vec!["report.pdf"]);
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let err = ex
            .extract_content(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();
        assert!(err.is_http_error());
    }

    #[tokio::test]
    async fn test_empty_strategy_output_uses_generic() {
        let mut server = Server::new_async().await;
        let body = "<html><body><p>tiny</p></body></html>";
        let mock = server
            .mock("GET", "/abs/2401.00001")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .expect(1)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = Url::parse(&format!("{}/abs/2401.00001", server.url())).unwrap();
        let ctx = ex.context(&url);
        assert_eq!(sites::run(Strategy::Arxiv, &ctx).await.unwrap(), "");

        let text = ex.run_with_fallback(Strategy::Arxiv, &ctx).await.unwrap();
        assert_eq!(text, body);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_strategy_error_uses_generic_without_refetch() {
        let mut server = Server::new_async().await;
        let body = "<html><body><div></div></body></html>";
        let mock = server
            .mock("GET", "/document/d/abc/edit")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .expect(1)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = Url::parse(&format!("{}/document/d/abc/edit", server.url())).unwrap();
        let ctx = ex.context(&url);
        let err = sites::run(Strategy::GoogleDocs, &ctx).await.unwrap_err();
        assert!(matches!(err, ExtractError::Parsing(_)));

        let text = ex.run_with_fallback(Strategy::GoogleDocs, &ctx).await.unwrap();
        assert_eq!(text, body);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_from_strategy_is_not_refetched() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/questions/9/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let ex = extractor(&server.url());
        let url = Url::parse(&format!("{}/questions/9/missing", server.url())).unwrap();
        let err = ex
            .run_with_fallback(Strategy::StackOverflow, &ex.context(&url))
            .await
            .unwrap_err();

        assert!(err.is_http_error());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreadable_arxiv_pdf_is_terminal() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pdf/2401.12345")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.5 scanned")
            .expect(1)
            .create_async()
            .await;

        let ex = extractor_with_pdf(&server.url(), FixedPages(Some(vec![""])));
        let url = Url::parse(&format!("{}/pdf/2401.12345", server.url())).unwrap();
        let err = ex
            .run_with_fallback(Strategy::Arxiv, &ex.context(&url))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ExtractError::ArxivPdfNotExtractable {
                suggested_url: "https://arxiv.org/abs/2401.12345".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_timeout_in_strategy_is_terminal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                });
            }
        });

        let config = ExtractorConfig::builder()
            .request_timeout_secs(1)
            .overall_timeout_secs(10)
            .build();
        let ex = ContentExtractor::new(config).unwrap();
        let url = Url::parse(&format!("http://{addr}/wiki/Slow")).unwrap();
        let err = ex
            .run_with_fallback(Strategy::Wikipedia, &ex.context(&url))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pdf_failure_maps_arxiv_pdf_links() {
        let pdf = Url::parse("https://arxiv.org/pdf/2401.12345v2").unwrap();
        assert_eq!(
            pdf_failure(Strategy::Arxiv, &pdf, ExtractError::PdfExtractionFailed),
            ExtractError::ArxivPdfNotExtractable {
                suggested_url: "https://arxiv.org/abs/2401.12345v2".to_string()
            }
        );

        let abs = Url::parse("https://arxiv.org/abs/2401.12345").unwrap();
        assert_eq!(
            pdf_failure(Strategy::Arxiv, &abs, ExtractError::PdfExtractionFailed),
            ExtractError::PdfExtractionFailed
        );

        let other = Url::parse("https://example.com/pdf/report").unwrap();
        assert_eq!(
            pdf_failure(Strategy::Generic, &other, ExtractError::PdfExtractionFailed),
            ExtractError::PdfExtractionFailed
        );
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let ex = extractor("http://127.0.0.1:9");
        let err = tokio_test::block_on(ex.extract_content("not a url")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));

        let err = tokio_test::block_on(ex.extract_content("ftp://example.com/file")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));
    }
}
