//! Content provider integration for the iTunes Search and RSS APIs.
//!
//! Providers hand back raw JSON payloads. Locating the result container and
//! mapping individual items are separate steps, so a malformed item never
//! fails a whole response.

mod itunes;
mod types;

pub use itunes::ItunesClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the content provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the connection failed.
    #[error("iTunes API request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("iTunes API did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// The API answered with a non-success status.
    #[error("iTunes API responded with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The body was not valid JSON.
    #[error("Failed to parse iTunes API response: {0}")]
    ParseError(String),

    /// Client could not be built from configuration.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Build a `Request` error carrying the whole source chain, so the
    /// underlying cause (e.g. "Connection refused") survives into responses.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ProviderError::Request(message)
    }
}

/// Trait for podcast content providers.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Search podcasts by free-text term.
    async fn search(&self, term: &str) -> Result<SearchPayload, ProviderError>;

    /// Fetch the trending (top podcasts) feed.
    async fn trending(&self) -> Result<FeedPayload, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_mentions_status() {
        let err = ProviderError::ApiError {
            status: 503,
            message: "down for maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "iTunes API responded with status 503: down for maintenance"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = ProviderError::Timeout { timeout_secs: 30 };
        assert!(err.to_string().contains("30s"));
    }
}
