//! Web search adapters.

use crate::config::SearchSettings;
use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Returned when a search yields nothing usable.
pub const NO_RESULTS: &str = "No relevant information found.";

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

/// Search and format the hits, masking failures behind [`NO_RESULTS`].
pub async fn search_or_sentinel(search: &dyn WebSearch, query: &str, limit: usize) -> String {
    match search.search(query, limit).await {
        Ok(hits) => format_hits(&hits),
        Err(e) => {
            warn!("Web search for '{}' failed: {}", query, e);
            NO_RESULTS.to_string()
        }
    }
}

/// Format hits as a bullet list, or the empty-result sentinel.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }

    hits.iter()
        .map(|hit| {
            if hit.body.is_empty() {
                format!("- {}", hit.title)
            } else {
                format!("- {}: {}", hit.title, hit.body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for web search backends.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web and return at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Deserialize)]
struct DuckDuckGoResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Result {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

fn collect_topics(topics: &[RelatedTopic], hits: &mut Vec<SearchHit>, limit: usize) {
    for topic in topics {
        if hits.len() >= limit {
            break;
        }
        match topic {
            RelatedTopic::Result { text, first_url } if !text.is_empty() => {
                let (title, body) = match text.split_once(" - ") {
                    Some((title, body)) => (title.trim(), body.trim()),
                    None => (text.trim(), ""),
                };
                hits.push(SearchHit {
                    title: title.to_string(),
                    body: body.to_string(),
                    url: Some(first_url.clone()).filter(|u| !u.is_empty()),
                });
            }
            RelatedTopic::Result { .. } => {}
            RelatedTopic::Group { topics } => collect_topics(topics, hits, limit),
        }
    }
}

/// DuckDuckGo Instant Answer client.
pub struct DuckDuckGo {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl DuckDuckGo {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            WaypointError::Config(format!("Invalid search endpoint '{}': {}", settings.endpoint, e))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("waypoint/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGo {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("no_html", "1")
            .append_pair("skip_disambig", "1");

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Search API returned error");
            return Err(WaypointError::Search(format!(
                "Search API returned status: {}",
                status
            )));
        }

        let body: DuckDuckGoResponse = response
            .json()
            .await
            .map_err(|e| WaypointError::Search(format!("Failed to parse search response: {}", e)))?;

        let mut hits = Vec::new();

        if !body.abstract_text.is_empty() {
            let title = if body.heading.is_empty() {
                query.to_string()
            } else {
                body.heading.clone()
            };
            hits.push(SearchHit {
                title,
                body: body.abstract_text.clone(),
                url: Some(body.abstract_url.clone()).filter(|u| !u.is_empty()),
            });
        }

        collect_topics(&body.related_topics, &mut hits, limit);
        hits.truncate(limit);

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }
}
