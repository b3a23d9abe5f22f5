//! # Clipper - URL content extraction for language models
//!
//! This crate fetches a URL, routes it to a site-specific extraction strategy
//! and reduces the page to bounded, LLM-ready prose plus a best-effort
//! metadata record.
//!
//! ## Features
//!
//! - Host-based routing for arXiv, GitHub, Medium, Stack Overflow, YouTube,
//!   Wikipedia and common social/document platforms
//! - Generic web extraction with boilerplate stripping and truncation
//! - OpenGraph and JSON-LD metadata recovery
//! - PDF text extraction with fall-through to web content
//! - Per-request and overall deadlines; no retries
//! - Bounded-concurrency batch extraction
//!
//! ## Example
//!
//! ```rust,no_run
//! use clipper::extract::{ContentExtractor, ExtractorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ContentExtractor::new(ExtractorConfig::from_env())?;
//!     let text = extractor
//!         .extract_content("https://github.com/rust-lang/rust")
//!         .await?;
//!
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

mod error;

pub mod batch;
pub mod extract;

pub use error::{Error, Result};

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::extract::{ContentExtractor, ExtractError, ExtractionResult, ExtractorConfig};
}
