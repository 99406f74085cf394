/*!
Configuration types for Recast.

Deserialized from TOML. A shipped `config.default.toml` provides defaults;
an optional `config.toml` (or `--config FILE`) overrides it key by key.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The blog being ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root listing URL, e.g. "https://beyondchats.com/blogs/"
    pub base_url: String,
    pub fetch_timeout_seconds: Option<u64>,
    /// How many new articles one ingestion run persists at most
    pub batch_size: Option<usize>,
}

/// The article CRUD API this system writes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// e.g. "http://127.0.0.1:8000/api/articles"
    pub api_url: String,
    pub timeout_seconds: Option<u64>,
}

/// Knobs for the enrichment run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichConfig {
    pub scrape_timeout_seconds: Option<u64>,
    /// Per-URL cap on scraped context passed to the rewrite engine
    pub max_context_chars: Option<usize>,
    /// Optional presentation prefix for rewritten titles, e.g. "(AI) "
    pub title_prefix: Option<String>,
}

/// Search provider config (used if `search.adapter = "http"`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub adapter: Option<String>, // "mock", "http"
    pub endpoint: Option<String>,
    pub api_key_env: Option<String>,
    /// Fixed results returned by the mock adapter
    pub mock_results: Option<Vec<String>>,
}

/// Rewrite engine config (used if `rewrite.adapter = "remote"`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteConfig {
    pub adapter: Option<String>, // "mock", "remote"
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub enrich: Option<EnrichConfig>,
    pub search: Option<SearchConfig>,
    pub rewrite: Option<RewriteConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
