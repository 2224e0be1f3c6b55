//! Generation error types.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::llm_client::LlmError;
use crate::schema::SchemaError;

/// Substrings in a service error that point at a missing or invalid key.
pub const CREDENTIAL_MARKERS: [&str; 2] = ["Requested entity was not found", "API key"];

/// Whether `message` reads like a credential failure.
pub fn is_credential_message(message: &str) -> bool {
    CREDENTIAL_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Broad category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GenerationErrorKind {
    /// The raw text was empty after trimming.
    #[display("empty input")]
    EmptyInput,
    /// The network or the provider failed.
    #[display("service failure")]
    Service,
    /// The service answered with something that is not a game descriptor.
    #[display("unparsable response")]
    Parse,
}

/// Generation error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Generation error ({}): {} at {}:{}", kind, message, file, line)]
pub struct GenerationError {
    /// Failure category.
    pub kind: GenerationErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GenerationError {
    /// Creates a new generation error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether this failure looks like a missing or invalid credential.
    pub fn is_credential_failure(&self) -> bool {
        self.kind == GenerationErrorKind::Service && is_credential_message(&self.message)
    }
}

impl From<LlmError> for GenerationError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        Self::new(GenerationErrorKind::Service, err.message)
    }
}

impl From<SchemaError> for GenerationError {
    #[track_caller]
    fn from(err: SchemaError) -> Self {
        Self::new(GenerationErrorKind::Parse, err.message)
    }
}
