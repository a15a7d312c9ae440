//! Configuration module for Brand-Watcher
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the environment overlay for email credentials.
//!
//! # Example
//!
//! ```no_run
//! use brand_watcher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("watcher.toml")).unwrap();
//! println!("Watching: {}", config.watch.brand_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EmailConfig, EmailSettings, FetchConfig, WatchConfig, DEFAULT_SMTP_PORT,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_config_with_env, parse_config};
