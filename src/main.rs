//! Game Master - classroom quiz-game generator
//!
//! Paste lesson text, get a playable game in the terminal.

#![warn(missing_docs)]

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use game_master::{
    AppConfig, Cli, Command, FlagHook, Generator, LlmClient, ShellController, run_tui,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,game_master=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = cli.model.clone() {
        config = config.with_model(model);
    }

    match cli.command() {
        Command::Play { timer } => {
            if let Some(timer) = timer {
                config = config.with_timer(timer);
            }
            run_play(config).await
        }
        Command::Generate { input } => run_generate(config, input.as_deref()).await,
    }
}

/// Sends all tracing output to `path` so the TUI is not corrupted.
fn init_tracing(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Runs the interactive shell.
#[instrument(skip(config), fields(provider = ?config.provider()))]
async fn run_play(config: AppConfig) -> Result<()> {
    info!(model = %config.model_name(), "Starting Game Master");

    let credentials = config.credentials();
    let hook = Arc::new(FlagHook::new());
    let client = LlmClient::new(config.llm_config(), credentials.clone());
    let generator = Generator::new(client).with_credential_hook(hook.clone());

    let controller = ShellController::new(
        config.settings(),
        Arc::new(generator),
        credentials,
        *config.provider(),
        hook,
    );
    run_tui(controller).await
}

/// Generates one game from a file or stdin and prints it as JSON.
#[instrument(skip(config), fields(provider = ?config.provider()))]
async fn run_generate(config: AppConfig, input: Option<&Path>) -> Result<()> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read lesson text from stdin")?;
            text
        }
    };
    info!(len = text.len(), "Generating game headlessly");

    let client = LlmClient::new(config.llm_config(), config.credentials());
    let game = Generator::new(client).generate(&text).await?;

    println!("{}", serde_json::to_string_pretty(&game)?);
    Ok(())
}
