//! Application configuration loaded from an optional TOML file.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::llm_client::{CredentialStore, LlmConfig, LlmProvider};
use crate::settings::{AppSettings, DEFAULT_STUDENTS, DEFAULT_TIMER_SECS};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "game_master.toml";

/// Configuration for the generator and the classroom defaults.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider (gemini, openai or anthropic).
    #[serde(default)]
    provider: LlmProvider,

    /// Model name; the provider's default when absent.
    #[serde(default)]
    model: Option<String>,

    /// Maximum tokens for the generated game.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Initial student roster.
    #[serde(default = "default_students")]
    students: Vec<String>,

    /// Initial countdown in seconds.
    #[serde(default = "default_timer")]
    timer: u32,
}

#[instrument]
fn default_max_tokens() -> u32 {
    16_384
}

#[instrument]
fn default_students() -> Vec<String> {
    DEFAULT_STUDENTS.iter().map(|s| s.to_string()).collect()
}

#[instrument]
fn default_timer() -> u32 {
    DEFAULT_TIMER_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            max_tokens: default_max_tokens(),
            students: default_students(),
            timer: default_timer(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(provider = ?config.provider, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the provider. The model resets to the provider default
    /// unless one is also overridden.
    #[instrument(skip(self))]
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        if provider != self.provider {
            self.model = None;
        }
        self.provider = provider;
        self
    }

    /// Overrides the model.
    #[instrument(skip(self))]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Overrides the countdown.
    #[instrument(skip(self))]
    pub fn with_timer(mut self, timer: u32) -> Self {
        self.timer = timer;
        self
    }

    /// Model name to use, falling back to the provider default.
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Creates the LLM configuration.
    #[instrument(skip(self), fields(provider = ?self.provider))]
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig::new(self.provider, self.model_name(), self.max_tokens)
    }

    /// Reads the provider's API key from the environment.
    ///
    /// A missing key is not an error here; the first generation reports it.
    #[instrument(skip(self))]
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::from_env(self.provider)
    }

    /// Initial classroom settings.
    #[instrument(skip(self))]
    pub fn settings(&self) -> AppSettings {
        AppSettings::new(self.students.clone(), self.timer)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
