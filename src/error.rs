//! Error types for the fancy loader.
//!

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArguments { argument: String, reason: String },
    #[error("Unknown sort `{name}` for model {model}")]
    UnknownSort { model: String, name: String },
    #[error("Missing partition key for model {model}")]
    MissingPartitionKey { model: String },
    #[error("Authorization scope `{scope}` failed: {message}")]
    Authorization { scope: String, message: String },
    #[error("Query transform `{name}` failed: {message}")]
    Transform { name: String, message: String },
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoaderError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn authorization(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authorization {
            scope: scope.into(),
            message: message.into(),
        }
    }

    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Name of the offending argument for `InvalidArguments`
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::InvalidArguments { argument, .. } => Some(argument),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
