use crate::config::types::{
    Config, OutputConfig, RateLimitConfig, RetryConfig, ScraperConfig, SiteConfig, UserAgentConfig,
};
use crate::url::parse_http_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_scraper_config(&config.scraper)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    parse_http_url(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 64, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_products < 1 {
        return Err(ConfigError::Validation(format!(
            "max-products must be >= 1, got {}",
            config.max_products
        )));
    }

    if config.page_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "page-cap must be >= 1, got {}",
            config.page_cap
        )));
    }

    if config.review_page_size < 1 || config.review_page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "review-page-size must be between 1 and 100, got {}",
            config.review_page_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if !config.max_rate.is_finite() || config.max_rate < 1.0 {
        return Err(ConfigError::Validation(format!(
            "max-rate must be >= 1 request/second, got {}",
            config.max_rate
        )));
    }

    if !(1.0..=config.max_rate).contains(&config.initial_rate) {
        return Err(ConfigError::Validation(format!(
            "initial-rate must be between 1 and max-rate ({}), got {}",
            config.max_rate, config.initial_rate
        )));
    }

    if config.min_jitter_ms > config.max_jitter_ms {
        return Err(ConfigError::Validation(format!(
            "min-jitter-ms ({}) cannot exceed max-jitter-ms ({})",
            config.min_jitter_ms, config.max_jitter_ms
        )));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 || config.attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "retry attempts must be between 1 and 10, got {}",
            config.attempts
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation("csv-dir cannot be empty".to_string()));
    }

    if config.json_dir.is_empty() {
        return Err(ConfigError::Validation(
            "json-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(agent) = config
        .pool
        .iter()
        .find(|ua| ua.trim().is_empty() || ua.chars().any(|c| c.is_control()))
    {
        return Err(ConfigError::Validation(format!(
            "user-agent pool contains an invalid entry: {:?}",
            agent
        )));
    }

    Ok(())
}
