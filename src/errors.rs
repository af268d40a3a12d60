use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No batch file matched the pattern in the source directory
    #[error("No input: no files matching '{pattern}' in {}", .dir.display())]
    NoInput { dir: PathBuf, pattern: String },
    /// Failed to parse batch file content
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Failed to flatten or write a tabular export
    #[error("Tabular export error: {0}")]
    TabularError(String),
    /// Failed to write a hierarchical (JSON) export
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    /// Returns `true` for errors that end the run rather than degrading to a warning.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::TabularError(_))
    }
}

// Conversion implementations for common errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::TabularError(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;
    use std::path::PathBuf;

    #[test]
    fn test_no_input_error_display() {
        let err = AppError::NoInput {
            dir: PathBuf::from("data/raw"),
            pattern: "apps_batch_*.json".to_string(),
        };

        let error_msg = err.to_string();
        assert!(error_msg.contains("data/raw"));
        assert!(error_msg.contains("apps_batch_*.json"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = AppError::ParseError("expected value at line 1".to_string());
        assert!(err.to_string().contains("Parse error"));
        assert!(err.to_string().contains("expected value at line 1"));
    }

    #[test]
    fn test_tabular_error_is_not_fatal() {
        assert!(!AppError::TabularError("key collision".into()).is_fatal());
        assert!(AppError::SerializationError("disk full".into()).is_fatal());
        assert!(AppError::ParseError("bad".into()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = AppError::from(io);
        assert!(matches!(err, AppError::IoError(_)));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn test_serde_json_error_maps_to_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert!(matches!(AppError::from(json_err), AppError::ParseError(_)));
    }

    #[test]
    fn test_app_error_implements_error_trait() {
        use std::error::Error;
        let err: Box<dyn Error> = Box::new(AppError::InvalidInput("test".to_string()));
        assert!(!err.to_string().is_empty());
    }
}
