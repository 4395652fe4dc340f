//! Error types for typed error handling.
//!
//! This module provides structured errors for the store, enabling callers
//! to distinguish codec failures from storage failures from bad
//! configuration.

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value could not be encoded into its storage representation.
    #[error("failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored data could not be decoded. Indicates corruption or data
    /// written by something other than this codec.
    #[error("failed to decode stored data: {0}")]
    Decode(#[source] serde_json::Error),

    /// The backing table failed (unreachable database, bad schema, disk
    /// failure). Never retried internally.
    #[error("storage error in {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// IO error with context (directory provisioning, file removal).
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration (bad store name, zero promotion threshold).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a storage error with context.
    pub fn storage(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Storage {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
