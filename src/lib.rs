//! Game Master library - lesson text in, classroom mini-game out
//!
//! An instructor pastes raw lesson text. An LLM turns it into a structured game
//! config, which is validated and played in the terminal.
//!
//! # Architecture
//!
//! - **Schema**: game kinds, item shapes and lenient validation of the
//!   service's JSON
//! - **Generation**: prompt building and one call to the LLM per request
//! - **Games**: quiz-show and memory-match state machines
//! - **Scheduler**: cancellable delayed events keyed to a play-through
//! - **Shell**: input → loading → playing
//! - **TUI**: ratatui screens and the event loop
//!
//! # Example
//!
//! ```no_run
//! use game_master::{AppConfig, Generator, LlmClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::default();
//! let client = LlmClient::new(config.llm_config(), config.credentials());
//! let game = Generator::new(client)
//!     .generate("Mặt trời mọc ở hướng đông.")
//!     .await?;
//! println!("{}", game.title());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod games;
mod generation;
mod llm_client;
mod scheduler;
mod schema;
mod settings;
mod shell;
mod tui;

// Crate-level exports - CLI
pub use cli::{Cli, Command, DEFAULT_LOG_FILE};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};

// Crate-level exports - LLM client
pub use llm_client::{
    CompletionBackend, CredentialStore, LlmClient, LlmConfig, LlmError, LlmProvider,
};

// Crate-level exports - Schema
pub use schema::{
    BubbleItem, GameConfig, GameItems, GameKind, GameRoute, OPTIONS_PER_QUESTION, Pair, Question,
    SchemaError, parse_game_config, strip_code_fence, validate_object,
};

// Crate-level exports - Generation
pub use generation::{
    CREDENTIAL_MARKERS, CredentialHook, GameSource, GenerationError, GenerationErrorKind,
    Generator, MEMORY_MAX_PAIRS, QUIZ_BANK_SIZE, build_prompt, is_credential_message,
};

// Crate-level exports - Settings
pub use settings::{
    AppSettings, DEFAULT_STUDENTS, DEFAULT_TIMER_SECS, MAX_TIMER_SECS, MIN_TIMER_SECS, clamp_timer,
};

// Crate-level exports - Scheduler
pub use scheduler::{PlaythroughId, Scheduler, TaskId};

// Crate-level exports - Games
pub use games::{
    Card, FlipOutcome, MATCH_DELAY, MATCH_POINTS, MISMATCH_DELAY, MemoryMatch, PRAISE_FALLBACK,
    QuizPhase, QuizShow, TICK, option_label,
};

// Crate-level exports - Shell
pub use shell::{GENERATION_FAILED_ALERT, Shell, ShellPhase};

// Crate-level exports - Terminal front end
pub use tui::{FlagHook, Screen, ScreenTransition, ShellController, TextBuffer, run_tui};
