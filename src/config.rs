//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the storefront catalog service,
//! supporting TOML files and environment variable overrides with validation
//! and type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use storefront_catalog::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{CatalogError, Result};
use crate::validation_error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Catalog data source settings
    pub catalog: CatalogConfig,
    /// Query engine behavior
    pub engine: EngineConfig,
    /// Logging and monitoring
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of HTTP worker threads
    pub workers: usize,
    /// Enable CORS (the demo frontend runs on a different origin)
    pub enable_cors: bool,
}

/// Catalog data source configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a catalog JSON file; the embedded reference catalog is used
    /// when unset
    pub data_path: Option<PathBuf>,
}

/// Query engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page size applied when a request omits `limit`
    pub default_page_size: usize,
    /// Upper bound for requested page sizes
    pub max_page_size: usize,
}

/// Logging and monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| CatalogError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("STOREFRONT_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("STOREFRONT_PORT") {
            self.server.port = port.parse().map_err(|_| CatalogError::Config {
                message: "Invalid port number in STOREFRONT_PORT".to_string(),
            })?;
        }
        if let Ok(data_path) = std::env::var("STOREFRONT_CATALOG_PATH") {
            self.catalog.data_path = Some(PathBuf::from(data_path));
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(validation_error!("server.port", "Port cannot be zero"));
        }

        if self.server.workers == 0 {
            return Err(validation_error!(
                "server.workers",
                "Worker count must be greater than zero"
            ));
        }

        if self.engine.default_page_size == 0 {
            return Err(validation_error!(
                "engine.default_page_size",
                "Default page size must be greater than zero"
            ));
        }

        if self.engine.max_page_size < self.engine.default_page_size {
            return Err(validation_error!(
                "engine.max_page_size",
                "Maximum page size cannot be less than the default"
            ));
        }

        if let Some(path) = &self.catalog.data_path {
            if !path.exists() {
                return Err(validation_error!(
                    "catalog.data_path",
                    format!("Catalog file not found: {:?}", path)
                ));
            }
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: num_cpus::get(),
            enable_cors: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.engine.default_page_size, 20);
        assert!(config.catalog.data_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9001\n\n[engine]\ndefault_page_size = 10"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.engine.default_page_size, 10);
        // Untouched sections keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.engine.max_page_size, 100);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::from_file("/definitely/not/here.toml").unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validation_rejects_zero_page_size() {
        let mut config = Config::default();
        config.engine.default_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_page_bounds() {
        let mut config = Config::default();
        config.engine.max_page_size = 5;
        assert!(config.validate().is_err());
    }
}
