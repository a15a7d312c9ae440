use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use brand_watcher::config::load_config;
///
/// let config = load_config(Path::new("watcher.toml")).unwrap();
/// println!("State file: {}", config.watch.state_path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Loads a configuration file and overlays email settings from the environment
///
/// A `.env` file in the working directory is honored when present.
pub fn load_config_with_env(path: &Path) -> Result<Config, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.email.apply_env(|name| std::env::var(name).ok())?;
    validate(&config)?;

    Ok(config)
}
