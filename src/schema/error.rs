//! Schema error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// A generated body that could not be read as a game descriptor.
#[derive(Debug, Clone, Display, Error)]
#[display("Schema error: {} at {}:{}", message, file, line)]
pub struct SchemaError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SchemaError {
    /// Creates a new schema error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid JSON: {}", err))
    }
}
