//! Types for the podcast catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::podcast::StoredPodcast;

/// Result of a single upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// The record as stored after the write.
    pub record: StoredPodcast,
    /// True when no record existed for the key before this write.
    pub inserted: bool,
}

/// Query for the weighted text search over stored podcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSearchQuery {
    /// Search text (matched against name, artist, description and genres).
    pub query: String,
    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

impl CatalogSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: default_limit(),
        }
    }
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total stored podcasts.
    pub total_podcasts: u64,
    /// Podcasts stored under a derived id.
    pub needs_review: u64,
    /// Oldest record (by creation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Most recently written record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Write deadline passed before commit")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}
