//! Command-line interface for game_master.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::llm_client::LlmProvider;

/// Default log file; the TUI owns the terminal, so logs go here.
pub const DEFAULT_LOG_FILE: &str = "game_master.log";

/// Game Master - turn lesson text into classroom mini-games
#[derive(Parser, Debug)]
#[command(name = "game_master")]
#[command(about = "Generate classroom quiz games from lesson text", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Generation provider (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub provider: Option<LlmProvider>,

    /// Model name (overrides the config file)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Log file path
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the terminal UI
    Play {
        /// Seconds per question (clamped to 5..=120)
        #[arg(short, long)]
        timer: Option<u32>,
    },

    /// Generate one game headlessly and print it as JSON
    Generate {
        /// File with the lesson text; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    /// The subcommand, with `play` filled in when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Play { timer: None })
    }
}
