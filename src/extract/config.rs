//! # Extractor Configuration Module
//!
//! Settings for fetching and extracting page content: request identity,
//! timeouts, the output budget, and the GitHub API endpoint. Built with
//! `ExtractorConfig::builder()` or loaded from `CLIPPER_*` environment
//! variables.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::extract::main_content::DEFAULT_MAX_CHARS;

/// Desktop Safari user agent; some sites serve stripped pages to unknown agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15";

/// Default public GitHub REST endpoint
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Configuration for the content extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Timeout applied to each HTTP request, in seconds
    pub request_timeout_secs: u64,

    /// Wall-clock bound on a content+metadata extraction, in seconds
    pub overall_timeout_secs: u64,

    /// Character budget for extracted body text
    pub max_content_chars: usize,

    /// Base URL of the GitHub REST API
    pub github_api_base: String,

    /// Optional token sent to the GitHub API
    pub github_token: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            overall_timeout_secs: 35,
            max_content_chars: DEFAULT_MAX_CHARS,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            github_token: None,
        }
    }
}

impl ExtractorConfig {
    /// Create a new builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }

    /// Load configuration from environment variables, keeping defaults for
    /// anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            user_agent: env::var("CLIPPER_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_secs: env_parse("CLIPPER_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            overall_timeout_secs: env_parse("CLIPPER_OVERALL_TIMEOUT_SECS")
                .unwrap_or(defaults.overall_timeout_secs),
            max_content_chars: env_parse("CLIPPER_MAX_CONTENT_CHARS")
                .unwrap_or(defaults.max_content_chars),
            github_api_base: env::var("CLIPPER_GITHUB_API_BASE")
                .unwrap_or(defaults.github_api_base),
            github_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.overall_timeout_secs < self.request_timeout_secs {
            return Err(Error::Config(
                "overall_timeout_secs must not be shorter than request_timeout_secs".to_string(),
            ));
        }
        if self.max_content_chars < 100 {
            return Err(Error::Config(
                "max_content_chars must be at least 100".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for ExtractorConfig
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Set the wall-clock bound for content+metadata extraction in seconds
    pub fn overall_timeout_secs(mut self, secs: u64) -> Self {
        self.config.overall_timeout_secs = secs;
        self
    }

    /// Set the character budget for body text
    pub fn max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.config.max_content_chars = max_content_chars;
        self
    }

    /// Point GitHub API calls at another base URL
    pub fn github_api_base(mut self, base: impl Into<String>) -> Self {
        self.config.github_api_base = base.into();
        self
    }

    /// Authenticate GitHub API calls
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.config.github_token = Some(token.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}
