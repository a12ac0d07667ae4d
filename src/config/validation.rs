use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the depth budget
pub const MAX_DEPTH_LIMIT: u32 = 32;

/// Upper bound on the fetch concurrency cap
pub const MAX_CONCURRENT_FETCHES_LIMIT: u32 = 1024;

/// Upper bound on the per-request timeout, in seconds
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start-url '{}': {}", config.start_url, e))
    })?;

    if !matches!(start.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' must use http or https",
            config.start_url
        )));
    }

    if config.max_depth < 1 || config.max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 1 and {}, got {}",
            MAX_DEPTH_LIMIT, config.max_depth
        )));
    }

    if let Some(limit) = config.max_concurrent_fetches {
        if limit < 1 || limit > MAX_CONCURRENT_FETCHES_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max-concurrent-fetches must be between 1 and {}, got {}",
                MAX_CONCURRENT_FETCHES_LIMIT, limit
            )));
        }
    }

    if let Some(secs) = config.fetch_timeout_secs {
        if secs < 1 || secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "fetch-timeout-secs must be between 1 and {}, got {}",
                MAX_FETCH_TIMEOUT_SECS, secs
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)
}

/// Checks for a `local@domain.tld` shape
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid contact-email: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    // Domain needs a dot that is neither first nor last
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}
