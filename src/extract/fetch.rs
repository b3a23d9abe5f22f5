//! HTTP fetching for the extraction pipeline
//!
//! One GET per call, bounded by the per-request timeout, no retries.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

use crate::extract::config::ExtractorConfig;
use crate::extract::error::ExtractError;

/// Response of a successful (2xx) fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    /// `Content-Type` header, empty when the server sent none
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// PDF by header or by `%PDF-` magic bytes
    pub fn is_pdf(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("application/pdf")
            || looks_like_pdf(&self.body)
    }

    /// HTML by header, or by leading markup when no header was sent
    pub fn is_html(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        if content_type.contains("html") {
            return true;
        }
        content_type.is_empty() && looks_like_html(&self.body)
    }

    /// Decode the body as UTF-8, falling back to UTF-16
    pub fn text(&self) -> Result<String, ExtractError> {
        decode_text(&self.body)
    }
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head: Vec<u8> = bytes[start..]
        .iter()
        .take(15)
        .map(u8::to_ascii_lowercase)
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html") || head.starts_with(b"<head")
}

/// UTF-8 first, then UTF-16 (byte order from the BOM, little endian without one).
pub fn decode_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.trim_start_matches('\u{feff}').to_string());
    }
    if bytes.len() % 2 != 0 {
        return Err(ExtractError::InvalidData);
    }

    let (big_endian, payload) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (true, rest),
        [0xFF, 0xFE, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| ExtractError::InvalidData)
}

/// Thin wrapper over a `reqwest::Client` configured for page fetching
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    timeout_secs: u64,
    github_token: Option<String>,
}

impl FetchClient {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ExtractError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
            github_token: config.github_token.clone(),
        })
    }

    /// GET a URL with the default headers
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, url: &str) -> Result<FetchedPage, ExtractError> {
        self.execute(url, self.client.get(url)).await
    }

    /// GET a GitHub API URL with an explicit `Accept` header and, when
    /// configured, a bearer token
    #[instrument(skip(self), level = "debug")]
    pub async fn get_github_api(
        &self,
        url: &str,
        accept: &str,
    ) -> Result<FetchedPage, ExtractError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.github_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.execute(url, request).await
    }

    async fn execute(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<FetchedPage, ExtractError> {
        let response = request
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(url, e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} answered HTTP {}", url, status);
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExtractError::from_reqwest(url, e, self.timeout_secs))?;

        debug!(
            "Fetched {} bytes ({}) from {}",
            body.len(),
            if content_type.is_empty() { "no content-type" } else { content_type.as_str() },
            url
        );

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_with_timeout(secs: u64) -> FetchClient {
        let config = ExtractorConfig::builder()
            .request_timeout_secs(secs)
            .overall_timeout_secs(secs)
            .build();
        FetchClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_success_reports_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", Matcher::Regex("^Mozilla/5.0 \\(Macintosh".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body>Hello</body></html>")
            .expect(1)
            .create_async()
            .await;

        let client = client_with_timeout(5);
        let page = client.get(&format!("{}/page", server.url())).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.content_type, "text/html; charset=utf-8");
        assert!(page.is_html());
        assert!(!page.is_pdf());
        assert_eq!(page.text().unwrap(), "<html><body>Hello</body></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pdf_sniffed_from_magic_bytes() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/raw")
            .with_status(200)
            .with_body("%PDF-1.7 fake")
            .create_async()
            .await;

        let page = client_with_timeout(5)
            .get(&format!("{}/raw", server.url()))
            .await
            .unwrap();
        assert!(page.is_pdf());
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let err = client_with_timeout(5)
            .get(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::HttpStatus { status: 404, .. }));
        assert!(err.is_http_error());
    }

    #[tokio::test]
    async fn test_github_api_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/o/r")
            .match_header("accept", "application/vnd.github.v3+json")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let config = ExtractorConfig::builder().github_token("tok").build();
        let client = FetchClient::new(&config).unwrap();
        client
            .get_github_api(
                &format!("{}/repos/o/r", server.url()),
                "application/vnd.github.v3+json",
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let err = client_with_timeout(1)
            .get(&format!("http://{addr}/slow"))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("héllo".as_bytes()).unwrap(), "héllo");

        let utf16: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("hi".encode_utf16().flat_map(u16::to_le_bytes))
            .collect();
        assert_eq!(decode_text(&utf16).unwrap(), "hi");

        assert_eq!(decode_text(&[0xC3]), Err(ExtractError::InvalidData));
    }

    #[test]
    fn test_html_sniffing_without_header() {
        let page = FetchedPage {
            url: "http://example.com".to_string(),
            status: 200,
            content_type: String::new(),
            body: b"  <!DOCTYPE html><html></html>".to_vec(),
        };
        assert!(page.is_html());
    }
}
