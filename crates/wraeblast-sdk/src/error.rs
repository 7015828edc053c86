//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Template rendering error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Document or filter parse error
    #[error("Parser error: {0}")]
    Parse(#[from] wraeblast_parser::ParseError),

    /// Element model error
    #[error("Model error: {0}")]
    Core(#[from] wraeblast_core::CoreError),

    /// Economic context error
    #[error("Insights error: {0}")]
    Insights(#[from] wraeblast_insights::InsightsError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown colormap name
    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::Config("thresholds must be a mapping".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("thresholds must be a mapping"));
    }

    #[test]
    fn test_unknown_colormap() {
        let error = SdkError::UnknownColormap("Rainbow_7".to_string());
        assert_eq!(error.to_string(), "Unknown colormap: Rainbow_7");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "options.yaml");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("options.yaml"));
    }

    #[test]
    fn test_insights_error_conversion() {
        let error: SdkError = wraeblast_insights::InsightsError::UnknownCategory("maps".into()).into();
        assert!(matches!(error, SdkError::Insights(_)));
    }
}
