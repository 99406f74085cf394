use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::harvest::Harvester;
use crate::models::NewArticle;
use crate::scraping;
use crate::storage::ArticleStore;

/// Outcome of one ingestion run. A batch with failures is still a
/// successful run; partial success is the expected terminal state.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs one ingestion pass: harvest up to `batch_size` of the oldest
/// listing stubs, fetch their full content sequentially (to bound load on
/// the source site), and persist each as a new unenriched article.
///
/// Articles whose source URL is already persisted are skipped, so
/// re-running against an unchanged listing creates no duplicates. A
/// create failure for one article is logged and does not block the rest
/// of the batch.
pub async fn run(
    harvester: &Harvester,
    client: &Client,
    store: &ArticleStore,
    batch_size: usize,
) -> IngestReport {
    let stubs = harvester.harvest_oldest(batch_size).await;
    if stubs.is_empty() {
        info!("no article stubs harvested, nothing to ingest");
        return IngestReport::default();
    }

    // Dedup key is the source URL. If the listing can't be cross-checked
    // the run proceeds without dedup rather than aborting.
    let known: HashSet<String> = match store.list().await {
        Ok(articles) => articles.into_iter().map(|a| a.original_url).collect(),
        Err(e) => {
            warn!(error = %e, "could not list existing articles, skipping dedup");
            HashSet::new()
        }
    };

    let mut report = IngestReport::default();
    for stub in stubs {
        if known.contains(&stub.source_url) {
            debug!(url = %stub.source_url, "already persisted, skipping");
            report.skipped += 1;
            continue;
        }

        info!(title = %stub.title, "processing stub");
        let content = scraping::fetch_full_content(client, &stub).await;

        let new_article = NewArticle {
            title: stub.title.clone(),
            content,
            original_url: stub.source_url.clone(),
            is_updated: false,
        };
        match store.create(&new_article).await {
            Ok(article) => {
                info!(id = article.id, title = %article.title, "article persisted");
                report.created += 1;
            }
            Err(e) => {
                error!(title = %stub.title, error = %e, "failed to persist article");
                report.failed += 1;
            }
        }
    }

    info!(
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "ingestion run complete"
    );
    report
}
