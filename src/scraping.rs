use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::extract::{self, ExtractMode};
use crate::models::{ArticleStub, ScrapedContext};

/// Builds the HTTP client shared by the scraping paths.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Recast/0.1.0")
        .build()
        .context("failed to build reqwest client")
}

/// Fetches a page and returns its body as text.
/// Retries transient failures (5xx, 429, network errors) with backoff;
/// client errors (4xx) are returned immediately.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let max_retries = 3;
    let mut last_error = None;

    for attempt in 1..=max_retries {
        if attempt > 1 {
            let backoff = Duration::from_secs(2u64.pow(attempt - 2)); // 1s, 2s, 4s...
            tracing::info!(
                "Retrying fetch for {} (attempt {}/{}) after {:?}...",
                url,
                attempt,
                max_retries,
                backoff
            );
            tokio::time::sleep(backoff).await;
        }

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.text().await.context("failed to read response body");
                } else if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                {
                    last_error = Some(anyhow::anyhow!("transient fetch error: {}", status));
                    continue;
                } else {
                    // Client error (4xx) - likely permanent, don't retry
                    return Err(anyhow::anyhow!("page fetch failed with status: {}", status));
                }
            }
            Err(e) => {
                last_error = Some(anyhow::Error::new(e).context("network error during fetch"));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error after retries")))
}

/// Fetches the permalink of a harvested stub and extracts the full article
/// content. A fetch failure or an extraction miss is logged and the stub's
/// listing excerpt is kept as a degraded but valid result.
pub async fn fetch_full_content(client: &Client, stub: &ArticleStub) -> String {
    match fetch_page(client, &stub.source_url).await {
        Ok(html) => {
            let full = extract::extract(&html, ExtractMode::Full);
            if full.is_empty() {
                warn!(url = %stub.source_url, "no extractable content, keeping listing excerpt");
                stub.excerpt.clone()
            } else {
                info!(
                    url = %stub.source_url,
                    bytes = full.len(),
                    "extracted full article content"
                );
                full
            }
        }
        Err(e) => {
            warn!(url = %stub.source_url, error = %e, "full-content fetch failed, keeping listing excerpt");
            stub.excerpt.clone()
        }
    }
}

/// Fetches an arbitrary URL and extracts its body text for use as rewrite
/// context, capped at `max_chars`. Failures yield an empty-content context
/// so one bad URL never aborts an enrichment run.
pub async fn scrape_context(client: &Client, url: &str, max_chars: usize) -> ScrapedContext {
    let content = match fetch_page(client, url).await {
        Ok(html) => {
            let text = extract::extract_text(&html);
            text.chars().take(max_chars).collect()
        }
        Err(e) => {
            warn!(%url, error = %e, "context scrape failed");
            String::new()
        }
    };
    ScrapedContext {
        url: url.to_string(),
        content,
    }
}
