use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::models::{Article, ArticleUpdate, NewArticle};

/// HTTP client for the article storage API.
///
/// The storage collaborator owns the `Article` records; this client only
/// speaks its CRUD contract (`GET /articles`, `GET /articles/{id}`,
/// `POST /articles`, `PUT /articles/{id}`) with JSON bodies.
pub struct ArticleStore {
    client: Client,
    base_url: String,
}

impl ArticleStore {
    pub fn new(api_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Recast/0.1.0")
            .build()
            .context("failed to build storage API client")?;
        Ok(Self {
            client,
            base_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("failed to list articles")?;
        let response = check_status(response, "list articles").await?;
        response
            .json::<Vec<Article>>()
            .await
            .context("failed to parse article list")
    }

    pub async fn get(&self, id: i64) -> Result<Article> {
        let url = format!("{}/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to fetch article {}", id))?;
        let response = check_status(response, "get article").await?;
        response
            .json::<Article>()
            .await
            .context("failed to parse article")
    }

    pub async fn create(&self, article: &NewArticle) -> Result<Article> {
        debug!(title = %article.title, "creating article");
        let response = self
            .client
            .post(&self.base_url)
            .json(article)
            .send()
            .await
            .context("failed to create article")?;
        let response = check_status(response, "create article").await?;
        response
            .json::<Article>()
            .await
            .context("failed to parse created article")
    }

    pub async fn update(&self, id: i64, update: &ArticleUpdate) -> Result<Article> {
        debug!(id, "updating article");
        let url = format!("{}/{}", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(update)
            .send()
            .await
            .with_context(|| format!("failed to update article {}", id))?;
        let response = check_status(response, "update article").await?;
        response
            .json::<Article>()
            .await
            .context("failed to parse updated article")
    }
}

async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("storage API rejected {}: {} {}", what, status, body)
}
