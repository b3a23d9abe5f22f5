//! Error types for the extraction module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for extraction operations
///
/// Errors carry plain strings rather than wrapping `reqwest::Error` so they can
/// be cloned: a failed primary page fetch is shared by every strategy that
/// asks for the page during one extraction call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Downloaded bytes could not be decoded as UTF-8 or UTF-16 text
    #[error("The downloaded content could not be decoded as text.")]
    InvalidData,

    /// Server answered with a status outside 200-299
    #[error("The server returned HTTP {status} for {url}.")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Transport failure or a response that is not valid HTTP
    #[error("The request to {url} did not return a valid HTTP response: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },

    /// Request or whole extraction ran past its deadline
    #[error("Timed out after {secs} seconds while fetching {url}.")]
    Timeout {
        /// Requested URL
        url: String,
        /// Deadline that fired
        secs: u64,
    },

    /// Reserved for strategies that reject malformed content
    #[error("The page content could not be parsed: {0}")]
    Parsing(String),

    /// PDF was downloaded but yielded no text
    #[error("No text could be extracted from this PDF. It may be scanned or encrypted.")]
    PdfExtractionFailed,

    /// arXiv PDF yielded no text; the abstract page usually works
    #[error("Could not extract text from this arXiv PDF. Try the abstract page instead: {suggested_url}")]
    ArxivPdfNotExtractable {
        /// Abstract page for the same paper id
        suggested_url: String,
    },

    /// Input was not an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ExtractError {
    /// Whether this is an HTTP-level failure (bad status or broken response)
    pub fn is_http_error(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Request { .. })
    }

    /// Whether a deadline fired
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Errors that end the call even when a specialised strategy fails
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ArxivPdfNotExtractable { .. } | Self::Timeout { .. } | Self::InvalidUrl(_)
        )
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for ExtractError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<ExtractError> for CrateError {
    fn from(err: ExtractError) -> Self {
        CrateError::Extract(err)
    }
}
