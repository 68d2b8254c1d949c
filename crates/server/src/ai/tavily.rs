//! Tavily web search client

use async_trait::async_trait;
use healthbuddy_core::{AdapterError, Snippet};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::adapter::SearchAdapter;

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const MAX_RESULTS: u32 = 3;
const PROVIDER: &str = "Tavily";

/// Client for the Tavily `/search` endpoint
#[derive(Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// Request body for the search API
#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

/// Response from the search API
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    raw_content: Option<String>,
}

/// Tavily reports errors as `{"detail": {"error": "..."}}` or `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ApiError {
    detail: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Nested { error: String },
    Plain(String),
}

impl TavilyClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl SearchAdapter for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<Snippet>, AdapterError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(PROVIDER))?;

        let request = SearchRequest {
            query,
            max_results: MAX_RESULTS,
            search_depth: "advanced",
            include_answer: false,
            include_raw_content: true,
        };

        tracing::debug!(query = %query, "Sending search request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(ApiError {
                    detail: ApiErrorDetail::Nested { error },
                }) => error,
                Ok(ApiError {
                    detail: ApiErrorDetail::Plain(message),
                }) => message,
                Err(_) => body,
            };
            return Err(AdapterError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;

        let snippets = normalize(parsed);
        tracing::debug!(results = snippets.len(), "Search returned");
        Ok(snippets)
    }
}

/// Turn raw hits into snippets, preferring the full page text over the summary.
/// Hits with no text at all are dropped.
fn normalize(response: SearchResponse) -> Vec<Snippet> {
    response
        .results
        .into_iter()
        .filter_map(|hit| {
            let body = hit
                .raw_content
                .filter(|text| !text.trim().is_empty())
                .or(hit.content.filter(|text| !text.trim().is_empty()))?;
            Some(Snippet::new(hit.title, hit.url, &body))
        })
        .take(MAX_RESULTS as usize)
        .collect()
}
