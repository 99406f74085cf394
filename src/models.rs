use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A lightweight, not-yet-fully-fetched article reference harvested
/// from a listing page. Discarded once the full content is persisted.
#[derive(Debug, Clone)]
pub struct ArticleStub {
    pub title: String,
    pub source_url: String,
    pub excerpt: String,
}

/// Body text scraped from one external URL, fed to the rewrite engine.
#[derive(Debug, Clone)]
pub struct ScrapedContext {
    pub url: String,
    pub content: String,
}

/// Article record as returned by the storage API.
///
/// The backend serializes snake_case JSON. Two quirks we tolerate on the
/// way in: `is_updated` may arrive as `0`/`1` instead of a bool, and
/// `source_citations` may be `null` or absent for unenriched articles.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub original_url: String,
    #[serde(default, deserialize_with = "citations_or_empty")]
    pub source_citations: Vec<String>,
    #[serde(deserialize_with = "bool_or_int")]
    pub is_updated: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create body for `POST /articles`.
#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub original_url: String,
    pub is_updated: bool,
}

/// Update body for `PUT /articles/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleUpdate {
    pub title: String,
    pub content: String,
    pub source_citations: Vec<String>,
    pub is_updated: bool,
}

fn bool_or_int<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

fn citations_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}
