//! Top-level orchestrator: input → loading → playing.
//!
//! The shell owns the draft lesson text, the classroom settings and the
//! current game. It knows nothing about terminals; the TUI drives it.

use derive_getters::Getters;
use tracing::{debug, error, info, instrument};

use crate::generation::{GameSource, GenerationError};
use crate::schema::{GameConfig, GameRoute};
use crate::settings::AppSettings;

/// Alert shown when generation fails for any reason.
pub const GENERATION_FAILED_ALERT: &str =
    "Đã xảy ra lỗi khi tạo trò chơi. Vui lòng kiểm tra lại dữ liệu nhập vào.";

/// Where the shell is in its flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellPhase {
    /// Editing the lesson text.
    Input,
    /// Waiting for the generation service.
    Loading,
    /// A game is being played.
    Playing(GameConfig),
}

/// Shell state machine.
#[derive(Debug, Clone, Getters)]
pub struct Shell {
    phase: ShellPhase,
    draft: String,
    settings: AppSettings,
    alert: Option<String>,
}

impl Shell {
    /// Creates a shell in the input phase.
    #[instrument(skip(settings))]
    pub fn new(settings: AppSettings) -> Self {
        info!("Creating Shell");
        Self {
            phase: ShellPhase::Input,
            draft: String::new(),
            settings,
            alert: None,
        }
    }

    /// Replaces the draft. Only possible while editing.
    #[instrument(skip(self, draft), fields(len = draft.len()))]
    pub fn set_draft(&mut self, draft: String) -> bool {
        if self.phase != ShellPhase::Input {
            return false;
        }
        self.draft = draft;
        true
    }

    /// Replaces the settings. Allowed in every phase.
    #[instrument(skip(self, settings))]
    pub fn set_settings(&mut self, settings: AppSettings) {
        debug!(
            students = settings.students().len(),
            timer = settings.timer_secs(),
            "Settings updated"
        );
        self.settings = settings;
    }

    /// Moves input → loading and returns the text to generate from.
    ///
    /// Returns `None`, with no state change, when not in the input phase or
    /// when the draft is blank.
    #[instrument(skip(self))]
    pub fn begin_generation(&mut self) -> Option<String> {
        if self.phase != ShellPhase::Input {
            debug!(phase = ?self.phase, "Generation request ignored");
            return None;
        }
        if self.draft.trim().is_empty() {
            debug!("Draft is empty, nothing to generate");
            return None;
        }
        self.phase = ShellPhase::Loading;
        info!(len = self.draft.len(), "Generation started");
        Some(self.draft.clone())
    }

    /// Applies the outcome of the generation started by
    /// [`Shell::begin_generation`].
    #[instrument(skip(self, outcome))]
    pub fn finish_generation(&mut self, outcome: Result<GameConfig, GenerationError>) {
        if self.phase != ShellPhase::Loading {
            debug!(phase = ?self.phase, "Stray generation outcome ignored");
            return;
        }
        match outcome {
            Ok(config) => {
                info!(
                    kind = %config.kind().tag(),
                    route = ?config.route(),
                    "Game ready"
                );
                self.phase = ShellPhase::Playing(config);
            }
            Err(e) => {
                error!(error = %e, "Generation failed");
                self.alert = Some(GENERATION_FAILED_ALERT.to_string());
                self.phase = ShellPhase::Input;
            }
        }
    }

    /// Runs one full generation against `source`.
    ///
    /// Returns whether a game is now being played.
    #[instrument(skip(self, source))]
    pub async fn generate<S: GameSource + ?Sized>(&mut self, source: &S) -> bool {
        let Some(text) = self.begin_generation() else {
            return false;
        };
        let outcome = source.generate_game(&text).await;
        self.finish_generation(outcome);
        self.is_playing()
    }

    /// Leaves the game and returns to input. The draft is kept.
    #[instrument(skip(self))]
    pub fn exit_game(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        info!("Leaving game");
        self.phase = ShellPhase::Input;
        true
    }

    /// Clears the alert after the user acknowledges it.
    pub fn dismiss_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// The game being played, if any.
    pub fn game(&self) -> Option<&GameConfig> {
        match &self.phase {
            ShellPhase::Playing(config) => Some(config),
            _ => None,
        }
    }

    /// Controller the current game dispatches to.
    pub fn route(&self) -> Option<GameRoute> {
        self.game().map(GameConfig::route)
    }

    /// Whether the shell is editing input.
    pub fn is_input(&self) -> bool {
        self.phase == ShellPhase::Input
    }

    /// Whether generation is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == ShellPhase::Loading
    }

    /// Whether a game is being played.
    pub fn is_playing(&self) -> bool {
        matches!(self.phase, ShellPhase::Playing(_))
    }
}
