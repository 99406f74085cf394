/*
recast - single-binary main.rs
One invocation runs one pipeline pass: `ingest` pulls the oldest unseen
articles off the source blog into storage, `enrich` rewrites one pending
article with fresh web context. Both are idempotent and safe to drive
from cron or any other scheduler.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use recast::config::Config;
use recast::enrich::{self, EnrichOptions, Outcome};
use recast::harvest::Harvester;
use recast::ingestion;
use recast::rewrite::{remote::RemoteRewriteEngine, MockRewriteEngine, RewriteEngine};
use recast::scraping;
use recast::search::{HttpSearchProvider, MockSearchProvider, SearchProvider};
use recast::storage::ArticleStore;

/// Search URLs the mock adapter falls back to when none are configured.
const DEFAULT_MOCK_RESULTS: [&str; 2] = [
    "https://en.wikipedia.org/wiki/Artificial_intelligence",
    "https://www.ibm.com/topics/artificial-intelligence",
];

#[derive(Parser, Debug)]
#[command(name = "recast", about = "Recast blog scraper + enrichment worker")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest the oldest unseen articles from the source blog and persist them
    Ingest {
        /// Override [source].batch_size for this run
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Rewrite one pending article using search results and scraped context
    Enrich,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let store = ArticleStore::new(
        &config.storage.api_url,
        config.storage.timeout_seconds.unwrap_or(10),
    )?;

    match args.command {
        Command::Ingest { batch_size } => {
            let batch_size = batch_size
                .or(config.source.batch_size)
                .unwrap_or(5);
            let client = scraping::build_client(config.source.fetch_timeout_seconds.unwrap_or(10))?;
            let harvester = Harvester::new(client.clone(), &config.source.base_url)?;

            let report = ingestion::run(&harvester, &client, &store, batch_size).await;
            if report.failed > 0 {
                warn!(failed = report.failed, "ingestion finished with per-article failures");
            }
            info!(
                created = report.created,
                skipped = report.skipped,
                "ingest command finished"
            );
        }
        Command::Enrich => {
            let enrich_cfg = config.enrich.clone().unwrap_or_default();
            let search = create_search_provider(&config)?;
            let engine = create_rewrite_engine(&config)?;
            let scrape_client =
                scraping::build_client(enrich_cfg.scrape_timeout_seconds.unwrap_or(10))?;
            let opts = EnrichOptions {
                max_context_chars: enrich_cfg.max_context_chars.unwrap_or(1000),
                title_prefix: enrich_cfg.title_prefix.unwrap_or_default(),
            };

            match enrich::run(&store, search.as_ref(), engine.as_ref(), &scrape_client, &opts).await
            {
                Outcome::Enriched(id) => info!(id, "enrich command finished, article rewritten"),
                Outcome::NoPendingWork => info!("enrich command finished, nothing pending"),
                // Reported, not propagated: a failed run is a normal
                // terminal state for a scheduled invocation.
                Outcome::Failed(reason) => warn!(%reason, "enrich command finished with failure"),
            }
        }
    }

    Ok(())
}

/// Create a search provider based on configuration
fn create_search_provider(config: &Config) -> Result<Box<dyn SearchProvider>> {
    let search_cfg = config.search.clone().unwrap_or_default();
    let adapter = search_cfg.adapter.as_deref().unwrap_or("mock");
    match adapter {
        "mock" => {
            let results = search_cfg.mock_results.unwrap_or_else(|| {
                DEFAULT_MOCK_RESULTS.iter().map(|s| s.to_string()).collect()
            });
            Ok(Box::new(MockSearchProvider::new(results)))
        }
        "http" => {
            let endpoint = search_cfg
                .endpoint
                .context("search.adapter = \"http\" requires search.endpoint")?;
            let api_key = match search_cfg.api_key_env.as_deref() {
                Some(env_name) if !env_name.is_empty() => Some(
                    std::env::var(env_name)
                        .with_context(|| format!("search API key env var '{}' not set", env_name))?,
                ),
                _ => None,
            };
            let provider = HttpSearchProvider::new(endpoint, api_key, 10)?;
            Ok(Box::new(provider))
        }
        _ => anyhow::bail!("Unknown search adapter type: {}", adapter),
    }
}

/// Create a rewrite engine based on configuration
fn create_rewrite_engine(config: &Config) -> Result<Box<dyn RewriteEngine>> {
    let rewrite_cfg = config.rewrite.clone().unwrap_or_default();
    let adapter = rewrite_cfg.adapter.as_deref().unwrap_or("mock");
    match adapter {
        "mock" => Ok(Box::new(MockRewriteEngine)),
        "remote" => {
            let api_url = rewrite_cfg
                .api_url
                .context("rewrite.adapter = \"remote\" requires rewrite.api_url")?;
            let api_key_env = rewrite_cfg
                .api_key_env
                .context("rewrite.adapter = \"remote\" requires rewrite.api_key_env")?;
            let api_key = std::env::var(&api_key_env)
                .with_context(|| format!("rewrite API key env var '{}' not set", api_key_env))?;
            let model = rewrite_cfg.model.unwrap_or_else(|| "gpt-4o-mini".to_string());

            let engine = RemoteRewriteEngine::new(api_url, api_key, model).with_defaults(
                rewrite_cfg.timeout_seconds.unwrap_or(30),
                rewrite_cfg.max_tokens.unwrap_or(1200),
                rewrite_cfg.temperature.unwrap_or(0.7),
            );
            Ok(Box::new(engine))
        }
        _ => anyhow::bail!("Unknown rewrite adapter type: {}", adapter),
    }
}
