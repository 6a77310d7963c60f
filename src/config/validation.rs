use crate::config::types::{Config, CrawlerConfig, IdentityConfig};
use crate::ConfigError;

/// Upper bound on concurrent fetch workers
const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_identity_config(&config.identity)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.robots_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "robots_timeout must be >= 100ms, got {}ms",
            config.robots_timeout_ms
        )));
    }

    if config.deadline_ms == Some(0) {
        return Err(ConfigError::Validation(
            "deadline must be greater than 0ms when set".to_string(),
        ));
    }

    if config.priority_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "priority_keywords cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identity pool
///
/// Every entry must be usable verbatim as a `User-Agent` header value.
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agents cannot contain empty entries".to_string(),
            ));
        }

        if agent.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "user agent '{}' contains control characters",
                agent.escape_debug()
            )));
        }
    }

    Ok(())
}
