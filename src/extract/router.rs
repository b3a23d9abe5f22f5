//! URL classification
//!
//! Chooses the extraction strategy for a URL from its host and path. The
//! decision is a pure function of the URL so it can be inspected without any
//! network access (`clipper route <url>`).

use serde::Serialize;
use url::Url;

/// Site family a URL is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Arxiv,
    GitHub,
    Medium,
    Twitter,
    YouTube,
    LinkedIn,
    StackOverflow,
    ProductHunt,
    Reddit,
    Wikipedia,
    Substack,
    Notion,
    GoogleDocs,
    Generic,
}

impl Strategy {
    /// Short display name used in logs and CLI output
    pub fn name(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::GitHub => "github",
            Self::Medium => "medium",
            Self::Twitter => "twitter",
            Self::YouTube => "youtube",
            Self::LinkedIn => "linkedin",
            Self::StackOverflow => "stackoverflow",
            Self::ProductHunt => "producthunt",
            Self::Reddit => "reddit",
            Self::Wikipedia => "wikipedia",
            Self::Substack => "substack",
            Self::Notion => "notion",
            Self::GoogleDocs => "google_docs",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Host fragments checked in order; the first contained fragment wins.
const HOST_TABLE: &[(&[&str], Strategy)] = &[
    (&["arxiv.org"], Strategy::Arxiv),
    (&["github.com"], Strategy::GitHub),
    (&["medium.com"], Strategy::Medium),
    (&["twitter.com", "x.com"], Strategy::Twitter),
    (&["youtube.com", "youtu.be"], Strategy::YouTube),
    (&["linkedin.com"], Strategy::LinkedIn),
    (&["stackoverflow.com", "stackexchange.com"], Strategy::StackOverflow),
    (&["producthunt.com"], Strategy::ProductHunt),
    (&["reddit.com"], Strategy::Reddit),
    (&["wikipedia.org"], Strategy::Wikipedia),
    (&["substack.com"], Strategy::Substack),
    (&["notion.so"], Strategy::Notion),
    (&["docs.google.com"], Strategy::GoogleDocs),
];

/// Routing decision for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Try PDF text extraction before the site strategy
    pub pdf_first: bool,
    /// Strategy used when the PDF attempt is skipped or yields nothing
    pub strategy: Strategy,
}

/// Classify a URL. PDF detection comes first, then host matching.
pub fn classify(url: &Url) -> Route {
    Route {
        pdf_first: is_pdf_url(url),
        strategy: strategy_for_host(url.host_str().unwrap_or_default()),
    }
}

/// `.pdf` path extension (any case) or `.pdf` anywhere in the URL string.
pub fn is_pdf_url(url: &Url) -> bool {
    let extension_is_pdf = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));

    extension_is_pdf || url.as_str().contains(".pdf")
}

/// Substring match against the host table, falling back to `Generic`.
pub fn strategy_for_host(host: &str) -> Strategy {
    let host = host.to_ascii_lowercase();
    HOST_TABLE
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|fragment| host.contains(fragment)))
        .map(|(_, strategy)| *strategy)
        .unwrap_or(Strategy::Generic)
}
