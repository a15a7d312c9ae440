use crate::config::types::{Config, EmailConfig, FetchConfig, WatchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_watch_config(&config.watch)?;
    validate_fetch_config(&config.fetch)?;
    validate_email_config(&config.email)?;
    Ok(())
}

/// Validates the watched listing and state location
fn validate_watch_config(config: &WatchConfig) -> Result<(), ConfigError> {
    if config.brand_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "brand_name cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.brand_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid brand_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "brand_url must use HTTP or HTTPS, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "brand_url '{}' has no host",
            config.brand_url
        )));
    }

    if config.state_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "state_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch and retry configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if !config.backoff_multiplier_secs.is_finite() || config.backoff_multiplier_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_multiplier_secs must be a non-negative number, got {}",
            config.backoff_multiplier_secs
        )));
    }

    if config.backoff_min_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_min_ms ({}) cannot exceed backoff_max_ms ({})",
            config.backoff_min_ms, config.backoff_max_ms
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates whatever email settings are present
///
/// Missing settings are fine here; they only disable delivery.
fn validate_email_config(config: &EmailConfig) -> Result<(), ConfigError> {
    if config.smtp_port == Some(0) {
        return Err(ConfigError::Validation(
            "smtp_port cannot be 0".to_string(),
        ));
    }

    // Blank addresses count as missing, same as unset ones
    for address in [&config.from, &config.to] {
        if let Some(address) = address.as_deref().filter(|v| !v.trim().is_empty()) {
            validate_email(address)?;
        }
    }

    Ok(())
}

/// Basic email validation
///
/// Accepts both `user@example.com` and `Name <user@example.com>`.
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let address = match (email.find('<'), email.rfind('>')) {
        (Some(start), Some(end)) if start < end => &email[start + 1..end],
        _ => email,
    }
    .trim();

    if address.is_empty() {
        return Err(ConfigError::Validation(
            "email address cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = address.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
