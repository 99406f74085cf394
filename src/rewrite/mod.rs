use anyhow::Result;

use crate::models::ScrapedContext;

/// Core trait for rewrite engines (mock or remote LLM).
///
/// Given the original article and the scraped contexts, in search-result
/// order, produces replacement content (HTML markup or text).
#[async_trait::async_trait]
pub trait RewriteEngine: Send + Sync {
    async fn rewrite(
        &self,
        title: &str,
        content: &str,
        contexts: &[ScrapedContext],
    ) -> Result<String>;
}

pub mod remote;

/// Deterministic rewrite used in development and tests: composes an HTML
/// skeleton that references each context source and quotes the original.
pub struct MockRewriteEngine;

#[async_trait::async_trait]
impl RewriteEngine for MockRewriteEngine {
    async fn rewrite(
        &self,
        title: &str,
        content: &str,
        contexts: &[ScrapedContext],
    ) -> Result<String> {
        let sources: String = contexts
            .iter()
            .map(|c| format!("<li>Data from {}</li>", c.url))
            .collect();
        let lede: String = content.chars().take(200).collect();
        Ok(format!(
            "<h2>(AI Rewritten) {}</h2>\n\
             <p><strong>Analysis of search results:</strong></p>\n\
             <ul>{}</ul>\n\
             <hr>\n\
             <p>{}...</p>\n\
             <p><em>(Refined with latest data from web)</em></p>",
            title, sources, lede
        ))
    }
}

/// Helper to peel markdown code fences off LLM output that should be bare
/// markup, e.g. "```html\n<p>..</p>\n```".
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag on the opening fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
