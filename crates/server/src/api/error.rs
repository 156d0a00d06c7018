//! Error responses for API handlers.
//!
//! Every failure body is JSON with an `error` message and, where available,
//! `details` (and `term` for searches without results).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use podscout_core::{CatalogError, DiscoveryError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

/// A failed request, translated at the handler boundary.
#[derive(Debug)]
pub enum ApiError {
    /// 400: the request was rejected before any work was done.
    Validation(String),
    /// 404
    NotFound {
        error: String,
        details: Option<String>,
        term: Option<String>,
    },
    /// 502: the content provider failed.
    Upstream(String),
    /// 500: the catalog failed.
    Storage(String),
    /// 500
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorResponse {
        match self {
            ApiError::Validation(message) => ErrorResponse {
                error: message,
                details: None,
                term: None,
            },
            ApiError::NotFound {
                error,
                details,
                term,
            } => ErrorResponse {
                error,
                details,
                term,
            },
            ApiError::Upstream(details) => ErrorResponse {
                error: "Failed to fetch from iTunes API".to_string(),
                details: Some(details),
                term: None,
            },
            ApiError::Storage(details) => ErrorResponse {
                error: "Database error".to_string(),
                details: Some(details),
                term: None,
            },
            ApiError::Internal(details) => ErrorResponse {
                error: "Internal server error".to_string(),
                details: Some(details),
                term: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Upstream(details) => warn!("Upstream failure: {}", details),
            ApiError::Storage(details) => error!("Storage failure: {}", details),
            ApiError::Internal(details) => error!("Internal failure: {}", details),
            _ => {}
        }
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::Validation(message) => ApiError::Validation(message),
            DiscoveryError::NoResults { term } => ApiError::NotFound {
                error: "No podcast results found".to_string(),
                details: None,
                term: Some(term),
            },
            DiscoveryError::InvalidFeed => ApiError::NotFound {
                error: "No trending podcasts found".to_string(),
                details: Some("Invalid response format from iTunes API".to_string()),
                term: None,
            },
            DiscoveryError::Upstream(e) => ApiError::Upstream(e.to_string()),
            DiscoveryError::Storage(details) => ApiError::Storage(details),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => ApiError::NotFound {
                error: "Podcast not found".to_string(),
                details: Some(format!("No podcast with collectionId {}", id)),
                term: None,
            },
            other => ApiError::Storage(other.to_string()),
        }
    }
}
