//! Parser error types

use thiserror::Error;
use wraeblast_core::CoreError;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// Filter text does not match the grammar
    #[error("Grammar error: {0}")]
    Grammar(String),

    /// A line parsed but its keyword or values are not valid
    #[error("Invalid statement on line {line}: {message}")]
    InvalidStatement { line: usize, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Type mismatch
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Model validation or resolution failure
    #[error("Invalid filter: {0}")]
    Model(#[from] CoreError),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
