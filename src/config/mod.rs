//! # Loader Configuration
//!
//! Settings that shape every plan a loader builds: the derived-table alias,
//! rank labels, page size limits and an optional tie-break column, plus the
//! logging setup.
//!
//! ## Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults ([`LoaderConfig::default`])
//! 2. `config/fancy-loader.{toml,yaml,json}`
//! 3. `config/fancy-loader-<environment>.{toml,yaml,json}`
//! 4. `FANCY_LOADER__*` environment variables (`FANCY_LOADER__LOGGING__LEVEL=warn`)
//!
//! Every file is optional. The merged result is validated before use.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fancy_loader::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let alias = &manager.config().subquery_alias;
//! let cap = manager.config().max_page_size;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{DEFAULT_RANK_SUFFIX, DEFAULT_SUBQUERY_ALIAS};
use crate::validation::validate_identifier;
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `fancy-loader.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Alias of the derived table the pagination predicate is applied to
    pub subquery_alias: String,

    /// Suffix of rank column labels (`email` -> `email_rank`)
    pub rank_suffix: String,

    /// Upper bound for `first` and `last`; unbounded when absent
    pub max_page_size: Option<i64>,

    /// Emit a warning when a plan is built for an empty key set
    pub warn_on_empty_keys: bool,

    /// Column appended as a final ascending sort term so ordinals are stable
    /// across executions when sort keys tie
    pub tie_break_column: Option<String>,

    pub logging: LoggingConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            subquery_alias: DEFAULT_SUBQUERY_ALIAS.to_string(),
            rank_suffix: DEFAULT_RANK_SUFFIX.to_string(),
            max_page_size: None,
            warn_on_empty_keys: true,
            tie_break_column: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        validate_identifier("subquery_alias", &self.subquery_alias).map_err(|e| {
            ConfigurationError::invalid_value("subquery_alias", &self.subquery_alias, e.to_string())
        })?;

        if !self.rank_suffix.is_empty()
            && !self
                .rank_suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigurationError::invalid_value(
                "rank_suffix",
                &self.rank_suffix,
                "may only contain ASCII letters, digits and underscores",
            ));
        }

        if let Some(max) = self.max_page_size {
            if max <= 0 {
                return Err(ConfigurationError::invalid_value(
                    "max_page_size",
                    max.to_string(),
                    "must be greater than 0",
                ));
            }
        }

        if let Some(column) = &self.tie_break_column {
            validate_identifier("tie_break_column", column).map_err(|e| {
                ConfigurationError::invalid_value("tie_break_column", column, e.to_string())
            })?;
        }

        self.logging.validate()
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    pub fn validate(&self) -> ConfigResult<()> {
        if !Self::LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigurationError::invalid_value(
                "logging.level",
                &self.level,
                format!("expected one of {}", Self::LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LoaderConfig::default();
        assert_eq!(config.subquery_alias, "subquery");
        assert_eq!(config.rank_suffix, "_rank");
        assert!(config.warn_on_empty_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_errors() {
        let config = LoaderConfig {
            subquery_alias: "sub query".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { ref field, .. }) if field == "subquery_alias"
        ));

        let config = LoaderConfig {
            max_page_size: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LoaderConfig {
            tie_break_column: Some("id; drop".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LoaderConfig {
            logging: LoggingConfig {
                level: "loud".to_string(),
                json: false,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_rank_suffix_is_allowed() {
        let config = LoaderConfig {
            rank_suffix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_documents_fill_defaults() {
        let config: LoaderConfig = serde_json::from_str(r#"{"max_page_size": 50}"#).unwrap();
        assert_eq!(config.max_page_size, Some(50));
        assert_eq!(config.subquery_alias, "subquery");
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
