use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the controller-facing API.
///
/// Faults raised *inside* a running program never surface here; they are
/// classified by the worker and reported through the run's
/// [`ExecutionResult`](crate::runtime::ExecutionResult).
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error(
        "Invalid working directory: '{}' does not exist or is not a directory",
        .0.display()
    )]
    InvalidWorkingDirectory(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    Pool(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
