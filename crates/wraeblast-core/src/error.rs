//! Error types for wraeblast core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A condition or action value does not fit its kind
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Socket group spec is malformed or holds more than six sockets
    #[error("Invalid socket group: {0}")]
    InvalidSocketGroup(String),

    /// Color literal could not be interpreted
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Unknown keyword for an enumerated domain value
    #[error("Unknown {kind}: {value}")]
    UnknownKeyword { kind: &'static str, value: String },

    /// Style referenced by name does not exist
    #[error("Style not found: {0}")]
    StyleNotFound(String),

    /// Preset referenced by name does not exist
    #[error("Preset not found: {0}")]
    PresetNotFound(String),
}

impl CoreError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for name-resolution failures (styles and presets)
    pub fn is_lookup(&self) -> bool {
        matches!(self, CoreError::StyleNotFound(_) | CoreError::PresetNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
