use std::path::PathBuf;
use thiserror::Error;

/// Main error type for netcfg
#[derive(Error, Debug)]
pub enum NetcfgError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// The file could not be read, so no fingerprint exists for it
    #[error("Cannot fingerprint {path}: {source}")]
    IdentityUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input bytes are not valid UTF-8
    #[error("Cannot decode {name} as UTF-8: {source}")]
    Decode {
        name: String,
        source: std::str::Utf8Error,
    },

    /// A redaction rule failed to compile or lacks a `secret` group
    #[error("Invalid redaction rule '{name}': {message}")]
    InvalidRule { name: String, message: String },

    /// Request rejected before any work was done
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Chunk store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM collaborator errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for netcfg operations
pub type Result<T> = std::result::Result<T, NetcfgError>;
