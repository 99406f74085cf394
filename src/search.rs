use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Core trait for search providers (mock or HTTP-backed).
///
/// Returns a ranked list of candidate source URLs for a query. Ranking
/// itself is the provider's business; the enrichment pipeline only
/// preserves the returned order.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

/// Fixed-result provider for development and tests.
pub struct MockSearchProvider {
    results: Vec<String>,
}

impl MockSearchProvider {
    pub fn new(results: Vec<String>) -> Self {
        Self { results }
    }
}

#[async_trait::async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        info!(%query, count = self.results.len(), "mock search returning fixed results");
        Ok(self.results.clone())
    }
}

/// Provider backed by an HTTP search endpoint.
///
/// Issues `GET {endpoint}?q={query}` with an optional bearer key and
/// expects `{"results": ["https://...", ...]}`.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSearchProvider {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Recast/0.1.0")
            .build()
            .context("failed to build search client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<String>,
}

#[async_trait::async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let mut request = self.client.get(&self.endpoint).query(&[("q", query)]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("search request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("search API error {}: {}", status, body);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("failed to parse search response")?;
        info!(%query, count = parsed.results.len(), "search returned candidate URLs");
        Ok(parsed.results)
    }
}
