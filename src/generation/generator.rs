//! The content generation client: prompt in, validated game out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use super::error::{GenerationError, GenerationErrorKind};
use super::prompt::build_prompt;
use crate::llm_client::CompletionBackend;
use crate::schema::{GameConfig, parse_game_config};

/// Hosting-environment capability that lets the user pick a new API key.
pub trait CredentialHook: Send + Sync {
    /// Asks the host to start its key-selection flow. Fire and forget.
    fn reselect_credential(&self);
}

/// Anything that can turn lesson text into a game.
///
/// The shell depends on this seam rather than on a concrete client.
#[async_trait]
pub trait GameSource: Send + Sync {
    /// Generates one game from `raw_text`.
    async fn generate_game(&self, raw_text: &str) -> Result<GameConfig, GenerationError>;
}

/// Generation client over a [`CompletionBackend`].
///
/// Makes exactly one backend call per request and never retries.
pub struct Generator<B> {
    backend: B,
    credential_hook: Option<Arc<dyn CredentialHook>>,
}

impl<B> std::fmt::Debug for Generator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("has_credential_hook", &self.credential_hook.is_some())
            .finish()
    }
}

impl<B: CompletionBackend> Generator<B> {
    /// Creates a generator without a credential hook.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            credential_hook: None,
        }
    }

    /// Installs the credential-reselection hook.
    pub fn with_credential_hook(mut self, hook: Arc<dyn CredentialHook>) -> Self {
        self.credential_hook = Some(hook);
        self
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generates a game from raw lesson text.
    ///
    /// # Errors
    ///
    /// - [`GenerationErrorKind::EmptyInput`] if `raw_text` is blank.
    /// - [`GenerationErrorKind::Service`] if the backend call fails. When the
    ///   message points at a bad credential, the hook fires first.
    /// - [`GenerationErrorKind::Parse`] if the body is empty or not a JSON
    ///   object.
    #[instrument(skip(self, raw_text), fields(raw_len = raw_text.len()))]
    pub async fn generate(&self, raw_text: &str) -> Result<GameConfig, GenerationError> {
        if raw_text.trim().is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::EmptyInput,
                "Lesson text is empty",
            ));
        }

        let prompt = build_prompt(raw_text);
        debug!(prompt_len = prompt.len(), "Prompt built");

        let body = match self.backend.complete_json(&prompt).await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Generation call failed");
                let err = GenerationError::from(e);
                if err.is_credential_failure() {
                    self.request_credential();
                }
                return Err(err);
            }
        };

        let config = parse_game_config(&body).map_err(|e| {
            error!(error = %e, "Generated body is not a game");
            GenerationError::from(e)
        })?;

        info!(
            kind = %config.kind().tag(),
            title = %config.title(),
            items = config.items().len(),
            "Game generated"
        );
        Ok(config)
    }

    #[instrument(skip(self))]
    fn request_credential(&self) {
        match &self.credential_hook {
            Some(hook) => {
                info!("Credential failure, asking host to reselect key");
                hook.reselect_credential();
            }
            None => warn!("Credential failure, but no reselection hook is available"),
        }
    }
}

#[async_trait]
impl<B: CompletionBackend> GameSource for Generator<B> {
    async fn generate_game(&self, raw_text: &str) -> Result<GameConfig, GenerationError> {
        self.generate(raw_text).await
    }
}
