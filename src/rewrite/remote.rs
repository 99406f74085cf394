use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{strip_code_fence, RewriteEngine};
use crate::models::ScrapedContext;

/// Remote rewrite engine using an OpenAI-compatible chat completion API.
pub struct RemoteRewriteEngine {
    base_url: String,
    api_key: String,
    model: String,
    default_timeout: Duration,
    default_max_tokens: usize,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteRewriteEngine {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 1200,
            default_temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(mut self, timeout_secs: u64, max_tokens: usize, temperature: f32) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    fn build_prompt(title: &str, content: &str, contexts: &[ScrapedContext]) -> String {
        let mut prompt = format!(
            r#"You are rewriting a published blog article using fresh supporting material gathered from the web.

IMPORTANT INSTRUCTIONS:
1. Preserve the article's topic and intent; update facts and framing using the sources below
2. Keep the formatting and tone of the original article
3. Return ONLY the rewritten article as clean HTML markup, no preamble and no code fences

ORIGINAL TITLE:
{}

ORIGINAL ARTICLE:
{}
"#,
            title, content
        );
        for (i, ctx) in contexts.iter().enumerate() {
            prompt.push_str(&format!("\nSOURCE {} ({}):\n{}\n", i + 1, ctx.url, ctx.content));
        }
        prompt
    }
}

#[async_trait::async_trait]
impl RewriteEngine for RemoteRewriteEngine {
    async fn rewrite(
        &self,
        title: &str,
        content: &str,
        contexts: &[ScrapedContext],
    ) -> Result<String> {
        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_prompt(title, content, contexts),
            }],
            max_tokens: Some(self.default_max_tokens),
            temperature: Some(self.default_temperature),
        };

        // Make HTTP request with timeout
        let response = tokio::time::timeout(
            self.default_timeout,
            self.client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("rewrite request timed out")?
        .context("rewrite HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("rewrite API error {}: {}", status, body);
        }

        let resp_body: OpenAiResponse = response
            .json()
            .await
            .context("failed to parse rewrite response")?;

        let choice = resp_body
            .choices
            .first()
            .context("rewrite response has no choices")?;

        Ok(strip_code_fence(&choice.message.content).to_string())
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}
