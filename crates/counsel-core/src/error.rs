use thiserror::Error;

/// Top-level error type for the Counsel system.
///
/// Subsystem crates define their own error types and convert into or out of
/// `CounselError` at crate boundaries so that `?` works across them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CounselError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<toml::de::Error> for CounselError {
    fn from(err: toml::de::Error) -> Self {
        CounselError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CounselError {
    fn from(err: toml::ser::Error) -> Self {
        CounselError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CounselError {
    fn from(err: serde_json::Error) -> Self {
        CounselError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Counsel operations.
pub type Result<T> = std::result::Result<T, CounselError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CounselError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = CounselError::Retrieval("store unreachable".to_string());
        assert_eq!(err.to_string(), "Retrieval error: store unreachable");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = CounselError::DimensionMismatch {
            expected: 1536,
            actual: 384,
        };
        assert_eq!(
            err.to_string(),
            "Vector dimension mismatch: expected 1536, got 384"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CounselError = io_err.into();
        assert!(matches!(err, CounselError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: CounselError = toml_err.into();
        assert!(matches!(err, CounselError::Config(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CounselError = json_err.into();
        assert!(matches!(err, CounselError::Serialization(_)));
    }
}
