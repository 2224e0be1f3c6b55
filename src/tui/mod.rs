//! Terminal front end — input, loading and game screens with overlays.

mod controller;
mod layout;
mod screen;
mod screens;
mod text_buffer;

pub use controller::{FlagHook, ShellController};
pub use screen::{Screen, ScreenTransition};
pub use text_buffer::TextBuffer;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument};

/// Sets up the terminal, runs `controller` until the user quits, and
/// restores the terminal even when the loop fails.
#[instrument(skip(controller))]
pub async fn run_tui(mut controller: ShellController) -> Result<()> {
    info!("Starting Game Master TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = controller.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Shell loop error");
    }
    res
}
