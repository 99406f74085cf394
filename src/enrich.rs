//! Enrichment pipeline: rewrites one pending article per run using search
//! results and scraped web context.
//!
//! Single pass, terminal after one article (or a no-op):
//! fetch pending -> search -> scrape fan-out -> rewrite -> persist update.
//! Nothing in here is fatal to the process; every run completes with an
//! [`Outcome`] so scheduled re-invocation is always safe.

use reqwest::Client;
use tracing::{info, warn};

use crate::models::{ArticleUpdate, ScrapedContext};
use crate::rewrite::RewriteEngine;
use crate::scraping;
use crate::search::SearchProvider;
use crate::storage::ArticleStore;

/// Terminal state of one enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Enriched(i64),
    NoPendingWork,
    Failed(String),
}

/// Knobs for one enrichment run, resolved from config by the caller.
pub struct EnrichOptions {
    /// Per-URL cap on context text handed to the rewrite engine.
    pub max_context_chars: usize,
    /// Optional presentation prefix for the persisted title.
    pub title_prefix: String,
}

/// Runs one enrichment pass over the first pending article, if any.
///
/// Citation policy: only URLs whose scrape produced non-empty content are
/// passed to the rewrite engine and persisted as citations. When no URL
/// yields content the run fails without touching the article, leaving it
/// pending for a later attempt.
pub async fn run(
    store: &ArticleStore,
    search: &dyn SearchProvider,
    engine: &dyn RewriteEngine,
    scrape_client: &Client,
    opts: &EnrichOptions,
) -> Outcome {
    // FETCH_PENDING: first article, in storage order, not yet updated
    let articles = match store.list().await {
        Ok(articles) => articles,
        Err(e) => return Outcome::Failed(format!("failed to list articles: {:#}", e)),
    };
    let Some(article) = articles.into_iter().find(|a| !a.is_updated) else {
        info!("no pending articles to enrich");
        return Outcome::NoPendingWork;
    };
    info!(id = article.id, title = %article.title, "enriching article");

    // SEARCH
    let urls = match search.search(&article.title).await {
        Ok(urls) => urls,
        Err(e) => return Outcome::Failed(format!("search failed: {:#}", e)),
    };

    // SCRAPE: every URL is attempted; a failed scrape records an
    // empty-content context instead of aborting the run.
    let mut contexts: Vec<ScrapedContext> = Vec::with_capacity(urls.len());
    for url in &urls {
        contexts.push(scraping::scrape_context(scrape_client, url, opts.max_context_chars).await);
    }
    let usable: Vec<ScrapedContext> =
        contexts.into_iter().filter(|c| !c.content.is_empty()).collect();
    info!(
        id = article.id,
        queried = urls.len(),
        usable = usable.len(),
        "context scrape complete"
    );
    if usable.is_empty() {
        warn!(id = article.id, "no scraped context had content, leaving article pending");
        return Outcome::Failed(format!("no usable context for article {}", article.id));
    }

    // REWRITE
    let rewritten = match engine.rewrite(&article.title, &article.content, &usable).await {
        Ok(content) => content,
        Err(e) => return Outcome::Failed(format!("rewrite failed: {:#}", e)),
    };

    // PERSIST_UPDATE, guarded by an optimistic re-check of the pending
    // flag. The storage API has no conditional update, so this narrows
    // the concurrent-run race rather than eliminating it.
    match store.get(article.id).await {
        Ok(current) if current.is_updated => {
            warn!(id = article.id, "article was updated by a concurrent run, discarding rewrite");
            return Outcome::Failed(format!("article {} already updated", article.id));
        }
        Ok(_) => {}
        Err(e) => {
            return Outcome::Failed(format!("failed to re-check article {}: {:#}", article.id, e))
        }
    }

    let update = ArticleUpdate {
        title: format!("{}{}", opts.title_prefix, article.title),
        content: rewritten,
        source_citations: usable.iter().map(|c| c.url.clone()).collect(),
        is_updated: true,
    };
    match store.update(article.id, &update).await {
        Ok(updated) => {
            info!(
                id = updated.id,
                citations = update.source_citations.len(),
                "article enriched"
            );
            Outcome::Enriched(updated.id)
        }
        Err(e) => Outcome::Failed(format!("failed to persist update for article {}: {:#}", article.id, e)),
    }
}
