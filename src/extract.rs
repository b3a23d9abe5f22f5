//! # Content Extraction Module
//!
//! Turns a URL into LLM-ready text plus a best-effort metadata record.
//!
//! ## Key Components
//!
//! - `ContentExtractor`: the service; content-only and content+metadata paths
//! - `classify`: pure host/path routing to a `Strategy`
//! - `FetchClient`: bounded HTTP GET with content-type sniffing
//! - `extract_main_content` and `extract_page_meta`: regex-based HTML reduction
//! - `PdfTextExtractor`: pluggable PDF text backend
//!
//! ## Usage
//!
//! ```no_run
//! use clipper::extract::{ContentExtractor, ExtractorConfig};
//!
//! # async fn run() -> Result<(), clipper::extract::ExtractError> {
//! let extractor = ContentExtractor::new(ExtractorConfig::default())?;
//! let result = extractor
//!     .extract_content_with_metadata("https://example.com/post")
//!     .await?;
//! println!("{}", result.context_string());
//! # Ok(())
//! # }
//! ```

mod config;
pub mod entities;
mod error;
mod extractor;
mod fetch;
mod main_content;
pub mod metadata;
mod pdf;
mod router;
mod sites;

pub use config::{DEFAULT_GITHUB_API_BASE, DEFAULT_USER_AGENT, ExtractorConfig, ExtractorConfigBuilder};
pub use entities::decode_html_entities;
pub use error::ExtractError;
pub use extractor::ContentExtractor;
pub use fetch::{FetchClient, FetchedPage, decode_text};
pub use main_content::{DEFAULT_MAX_CHARS, TRUNCATION_MARKER, clean_fragment, extract_main_content};
pub use metadata::{PageMeta, extract_page_meta};
pub use pdf::{PdfExtractBackend, PdfTextExtractor, pdf_to_text};
pub use router::{Route, Strategy, classify, is_pdf_url};

use serde::{Deserialize, Serialize};
use url::Url;

/// Best-effort metadata for one extracted URL. Only `url` is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Requested URL
    pub url: String,

    pub title: Option<String>,

    pub description: Option<String>,

    pub og_title: Option<String>,

    pub og_description: Option<String>,

    pub og_type: Option<String>,

    pub author: Option<String>,

    /// Published date exactly as the page wrote it
    pub published_date: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Host of the requested URL
    pub domain: Option<String>,

    /// Non-empty path segments, without the `/` separators
    #[serde(default)]
    pub path_components: Vec<String>,

    /// `Content-Type` header of the response
    pub content_type: Option<String>,
}

impl ContentMetadata {
    /// Metadata derivable from the URL alone
    pub fn for_url(url: &Url, content_type: Option<&str>) -> Self {
        let path_components = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            url: url.to_string(),
            domain: url.host_str().map(str::to_string),
            path_components,
            content_type: content_type.map(str::to_string),
            ..Self::default()
        }
    }

    /// URL-derived metadata enriched from the page markup
    pub fn from_html(url: &Url, html: &str, content_type: Option<&str>) -> Self {
        let meta = extract_page_meta(html);
        Self {
            title: meta.title,
            description: meta.description,
            og_title: meta.og_title,
            og_description: meta.og_description,
            og_type: meta.og_type,
            author: meta.author,
            published_date: meta.published_date,
            keywords: meta.keywords,
            ..Self::for_url(url, content_type)
        }
    }
}

/// Extracted text paired with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub metadata: ContentMetadata,
}

impl ExtractionResult {
    /// Metadata header followed by the content, as handed to a language model.
    pub fn context_string(&self) -> String {
        let meta = &self.metadata;
        let keywords = (!meta.keywords.is_empty()).then(|| meta.keywords.join(", "));

        let mut header = vec![format!("URL: {}", meta.url)];
        let fields = [
            ("Title", meta.title.as_deref()),
            ("Description", meta.description.as_deref()),
            ("Author", meta.author.as_deref()),
            ("Published", meta.published_date.as_deref()),
            ("Keywords", keywords.as_deref()),
            ("Domain", meta.domain.as_deref()),
        ];
        header.extend(
            fields
                .iter()
                .filter_map(|(name, value)| value.map(|v| format!("{name}: {v}"))),
        );

        format!("{}\n\nContent:\n{}", header.join("\n"), self.content)
    }
}
