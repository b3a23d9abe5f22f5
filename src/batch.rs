//! Bounded-concurrency extraction over a list of URLs

use std::path::Path;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::{ContentExtractor, ExtractionResult};

/// Outcome for one URL of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,

    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.extraction.is_some()
    }
}

/// Read a URL list: one URL per line, blank lines and `#` comments skipped.
pub async fn read_url_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    debug!("Read {} URLs from {}", urls.len(), path.as_ref().display());
    Ok(urls)
}

/// Extract every URL with at most `concurrency` requests in flight.
///
/// `on_done` runs as each URL finishes, in completion order. The returned
/// outcomes follow input order.
pub async fn extract_many<F>(
    extractor: &ContentExtractor,
    urls: Vec<String>,
    concurrency: usize,
    mut on_done: F,
) -> Vec<BatchOutcome>
where
    F: FnMut(&BatchOutcome),
{
    let total = urls.len();
    let mut indexed: Vec<(usize, BatchOutcome)> = stream::iter(urls.into_iter().enumerate())
        .map(|(index, url)| async move {
            let outcome = match extractor.extract_content_with_metadata(&url).await {
                Ok(extraction) => BatchOutcome {
                    url,
                    extraction: Some(extraction),
                    error: None,
                },
                Err(e) => BatchOutcome {
                    url,
                    extraction: None,
                    error: Some(e.to_string()),
                },
            };
            (index, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .inspect(|(_, outcome)| on_done(outcome))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<BatchOutcome> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    info!("Batch finished: {}/{} URLs extracted", succeeded, total);
    outcomes
}

/// Pretty-printed JSON array of batch outcomes
pub fn outcomes_json(outcomes: &[BatchOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

/// Write batch outcomes to `path` as JSON.
pub async fn save_outcomes(path: impl AsRef<Path>, outcomes: &[BatchOutcome]) -> Result<()> {
    let json = outcomes_json(outcomes)?;
    tokio::fs::write(path.as_ref(), json).await?;
    info!("Saved {} outcomes to {}", outcomes.len(), path.as_ref().display());
    Ok(())
}
