//! Configuration management for imgbatch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use imgbatch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `IMGBATCH__<section>__<key>`
//!
//! Examples:
//! - `IMGBATCH__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `IMGBATCH__STORAGE__PROVIDER=s3`
//! - `IMGBATCH__BATCH__CONCURRENCY=8`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/imgbatch.toml`.
//! This can be overridden using the `IMGBATCH_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{
    BatchConfig, CompressionDefaults, Config, FailurePolicy, ServerConfig, StorageConfig,
    StorageProvider,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`IMGBATCH__*`)
    /// 2. TOML file (default: `config/imgbatch.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(sources::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
