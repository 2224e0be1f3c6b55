//! Content generation: prompt building, the service call and error mapping.

mod error;
mod generator;
mod prompt;

pub use error::{CREDENTIAL_MARKERS, GenerationError, GenerationErrorKind, is_credential_message};
pub use generator::{CredentialHook, GameSource, Generator};
pub use prompt::{MEMORY_MAX_PAIRS, QUIZ_BANK_SIZE, build_prompt};
