//! Configuration management for fintrack
//!
//! This module handles loading, validation, and management of
//! fintrack configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Remote store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL the `/transactions`, `/budgets` and `/categories` collections hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

/// Reconciliation behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Re-read the canonical record after a successful update instead of
    /// keeping the optimistic local copy
    #[serde(default = "default_false")]
    pub refetch_after_update: bool,
}

fn default_false() -> bool {
    false
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator (empty disables grouping)
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_symbol() -> String {
    "₹".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

impl std::str::FromStr for SymbolPosition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            _ => Err(format!("Invalid symbol position: {}", s)),
        }
    }
}

impl std::fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolPosition::Before => write!(f, "before"),
            SymbolPosition::After => write!(f, "after"),
        }
    }
}

/// Dashboard and insight settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Number of recent transactions on the dashboard
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
    /// Number of categories named in the top-spending insight
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_count: default_recent_count(),
            top_categories: default_top_categories(),
        }
    }
}

fn default_recent_count() -> usize {
    5
}

fn default_top_categories() -> usize {
    2
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote store settings
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Reconciliation settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Dashboard and insight settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        // hyper's plain connector only speaks http
        if !self.remote.base_url.starts_with("http://") {
            return Err(ConfigError::InvalidValue {
                field: "remote.base_url".to_string(),
                reason: "Base URL must start with http://".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.analytics.recent_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analytics.recent_count".to_string(),
                reason: "Recent transaction count must be greater than 0".to_string(),
            });
        }

        if self.analytics.top_categories == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analytics.top_categories".to_string(),
                reason: "Top category count must be greater than 0".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level '{}'", other),
                })
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full URL of a remote collection, e.g. `collection_url("transactions")`
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.remote.base_url.trim_end_matches('/'), collection)
    }
}

// ==================== Tests ====================
