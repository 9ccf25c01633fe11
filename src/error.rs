//! Error types for vault maintenance.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the vault host and the redirect commands.
///
/// Resolution misses are not errors; they surface as `None` and are skipped.
#[derive(Debug, Error)]
pub enum RedirectorError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("can NOT find file: {0}")]
    FileNotFound(String),

    #[error("the acquired path-separator is strange, it's {0} , so stop the execution")]
    UnexpectedPathSeparator(String),

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl RedirectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RedirectorError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = RedirectorError> = std::result::Result<T, E>;
