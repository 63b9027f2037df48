// SPDX-License-Identifier: MIT

//! Typed error handling for scribe-rs
//!
//! Only conditions that must stop a run are represented here. Recoverable
//! failures inside a stage are carried as data in the workflow state.

use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Top-level error type for scribe-rs
#[derive(Debug, Error)]
pub enum ScribeError {
    /// API errors from a model provider
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (invalid values, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template could not be loaded, parsed or rendered
    #[error("Template error in '{name}': {message}")]
    Template { name: String, message: String },

    /// Model/LLM errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A stage ran without a state field it requires
    #[error("Missing required state field: {0}")]
    MissingField(&'static str),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider name not recognised
    #[error("Unsupported model provider: {0}")]
    UnsupportedProvider(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// The model answered without any text
    #[error("Model returned no text")]
    EmptyResponse,
}

impl ScribeError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a template error
    pub fn template(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Template {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
