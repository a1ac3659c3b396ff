//! Configuration Error Types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Sources could not be read, parsed or merged
    #[error("Failed to load configuration from '{config_directory}': {source}")]
    Load {
        config_directory: String,
        #[source]
        source: config::ConfigError,
    },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn load(config_directory: impl Into<String>, source: config::ConfigError) -> Self {
        Self::Load {
            config_directory: config_directory.into(),
            source,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
