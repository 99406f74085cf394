// Library interface for recast modules
// This allows tests and other binaries to import modules

pub mod config;
pub mod enrich;
pub mod extract;
pub mod harvest;
pub mod ingestion;
pub mod models;
pub mod rewrite;
pub mod scraping;
pub mod search;
pub mod storage;
