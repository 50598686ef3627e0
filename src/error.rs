use crate::client::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the query builder
#[derive(Error, Debug)]
pub enum BuilderError {
    /// No index was set before compiling a document
    #[error("Index is empty: call set_index before compiling")]
    MissingIndex,

    /// An id-addressed operation has no document id
    #[error("Document id is required for {operation}")]
    IdentifierRequired { operation: &'static str },

    /// Insert, bulk or update was given nothing to write
    #[error("Empty input for {operation}")]
    EmptyInput { operation: &'static str },

    /// Predicate bucket is not one of must, must_not, should, filter
    #[error("Boolean bucket '{bucket}' is not recognized")]
    BooleanOperator { bucket: String },

    /// Collapse and group-by cannot be compiled together
    #[error("Collapse on '{collapse}' cannot be combined with group by '{group_by}'")]
    ConflictingModes { collapse: String, group_by: String },

    /// Verb name has no entry in the verb table
    #[error("Unknown builder verb: {verb}")]
    UnknownVerb { verb: String },

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

    /// Errors raised by the search client, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),
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

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, BuilderError>;
