//! Error types for catalog construction and cache-size estimation

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the registry, loader, and calculator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A runtime parameter violated the calculator's preconditions
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A model record in the catalog is malformed
    #[error("Configuration error in model {model} variant {variant}: {message}")]
    ConfigError {
        model: String,
        variant: String,
        message: String,
    },

    /// No variant with the requested name exists in the model
    #[error("Variant {variant} not found in model {model}")]
    VariantNotFound { model: String, variant: String },

    /// No model with the requested name is registered
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn config(
        model: impl Into<String>,
        variant: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            model: model.into(),
            variant: variant.into(),
            message: message.into(),
        }
    }
}
