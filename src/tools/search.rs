//! Web search adapter backed by SerpAPI.

use crate::config::SearchSettings;
use crate::error::{CallBriefError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Hard cap on results handed back to the agent.
pub const MAX_RESULTS: usize = 3;

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: Url,
}

/// Outcome of a search that ran.
///
/// `Empty` means the search happened and found nothing, which is different
/// from no search having been made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "hits", rename_all = "snake_case")]
pub enum SearchResult {
    Hits(Vec<SearchHit>),
    Empty,
}

impl SearchResult {
    /// Build a result from hits, capping at [`MAX_RESULTS`].
    pub fn from_hits(mut hits: Vec<SearchHit>) -> Self {
        hits.truncate(MAX_RESULTS);
        if hits.is_empty() {
            SearchResult::Empty
        } else {
            SearchResult::Hits(hits)
        }
    }

    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchResult::Hits(hits) => hits,
            SearchResult::Empty => &[],
        }
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Empty => write!(f, "No results found."),
            SearchResult::Hits(hits) => {
                let lines = hits
                    .iter()
                    .map(|h| format!("{}: {}", h.title, h.link))
                    .collect::<Vec<_>>()
                    .join("\n");
                f.write_str(&lines)
            }
        }
    }
}

/// Trait for web search services.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run a query and return the top results.
    async fn search(&self, query: &str) -> Result<SearchResult>;
}

/// SerpAPI (Google engine) search client.
pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    engine: String,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

impl SerpApiSearch {
    /// Create a new SerpAPI client with an explicit key.
    pub fn new(api_key: impl Into<String>, settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CallBriefError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            engine: settings.engine.clone(),
            num_results: settings.num_results.clamp(1, MAX_RESULTS),
        })
    }
}

#[async_trait]
impl WebSearch for SerpApiSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CallBriefError::InvalidInput("search query is empty".to_string()));
        }

        let num = self.num_results.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("engine", self.engine.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CallBriefError::Search(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallBriefError::Search(format!(
                "SerpAPI returned status {}: {}",
                status, body
            )));
        }

        let body: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| CallBriefError::Search(format!("failed to parse response: {}", e)))?;

        if let Some(error) = body.error {
            // SerpAPI reports "no results" as an error string on a 200.
            debug!("SerpAPI reported: {}", error);
            return Ok(SearchResult::Empty);
        }

        let hits = body
            .organic_results
            .into_iter()
            .filter_map(|r| match Url::parse(&r.link) {
                Ok(link) => Some(SearchHit {
                    title: r.title.trim().to_string(),
                    link,
                }),
                Err(e) => {
                    warn!("Skipping search result with bad link '{}': {}", r.link, e);
                    None
                }
            })
            .take(self.num_results)
            .collect();

        let result = SearchResult::from_hits(hits);
        debug!(count = result.hits().len(), "search completed");
        Ok(result)
    }
}
