use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Output failed: {0}")]
pub struct OutputError(pub String);

impl From<std::io::Error> for OutputError {
    fn from(e: std::io::Error) -> Self {
        OutputError(e.to_string())
    }
}

/// Destination for everything a program writes.
pub trait OutputSink: Send + Sync {
    fn write(&self, value: &Value) -> Result<(), OutputError>;
    fn clear(&self) -> Result<(), OutputError>;
}
