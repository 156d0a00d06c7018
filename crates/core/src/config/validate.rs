use super::{types::Config, ConfigError};

/// Largest feed size the iTunes RSS generator accepts.
const MAX_TRENDING_LIMIT: u32 = 200;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Database timeouts are non-zero
/// - Provider base URL parses and the trending limit is in range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.database.busy_timeout_ms == 0 || config.database.operation_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "database timeouts must be greater than 0".to_string(),
        ));
    }

    let provider = &config.provider;
    if let Err(e) = reqwest::Url::parse(&provider.base_url) {
        return Err(ConfigError::ValidationError(format!(
            "provider.base_url '{}' is not a valid URL: {}",
            provider.base_url, e
        )));
    }

    if provider.trending_limit == 0 || provider.trending_limit > MAX_TRENDING_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "provider.trending_limit must be between 1 and {}",
            MAX_TRENDING_LIMIT
        )));
    }

    if provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "provider.timeout_secs cannot be 0".to_string(),
        ));
    }

    if provider.country.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.country cannot be empty".to_string(),
        ));
    }

    Ok(())
}
