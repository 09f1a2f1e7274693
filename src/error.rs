//! Error types for building and summarizing VERIS tables.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, VerisError>;

/// Errors that can occur while loading, building or summarizing VERIS data.
///
/// Malformed record values are never reported here: the materializer treats
/// them as non-matches.
#[derive(Error, Debug)]
pub enum VerisError {
    /// A schema or record file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema or record file did not contain valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The record discovery pattern was invalid.
    #[error("invalid record pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The requested confidence interval method is not one we compute.
    #[error("confidence interval method '{0}' is not implemented")]
    UnsupportedCiMethod(String),

    /// A requested mode of operation is not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A parameter was outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Columnar export failed.
    #[error("arrow export failed: {0}")]
    Arrow(#[from] arrow2::error::Error),

    /// Pipeline configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl VerisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_method_names_the_method() {
        let err = VerisError::UnsupportedCiMethod("donuts".to_string());
        assert!(err.to_string().contains("donuts"));
    }

    #[test]
    fn test_io_error_names_the_path() {
        let err = VerisError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.json"));
        assert!(msg.contains("gone"));
    }
}
