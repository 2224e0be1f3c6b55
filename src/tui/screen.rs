//! Screen trait and transition type for the shell's terminal front end.

use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::settings::AppSettings;

/// The result of handling an input event on a screen.
///
/// Screens return this from [`Screen::handle_key`] to drive the
/// [`ShellController`](super::ShellController) state machine.
///
/// `Debug` never prints a typed API key.
#[derive(Clone)]
pub enum ScreenTransition {
    /// Stay on the current screen — no state change.
    Stay,
    /// Generate a game from the given lesson text.
    Submit {
        /// The draft as typed.
        text: String,
    },
    /// Leave the running game and return to input.
    ExitGame,
    /// Open the settings overlay.
    OpenSettings,
    /// Close the settings overlay, keeping the edited settings.
    SaveSettings(AppSettings),
    /// Close the API-key overlay, storing the entered key.
    SaveApiKey(String),
    /// Close the topmost overlay without changes.
    CloseOverlay,
    /// Exit the application cleanly.
    Quit,
}

impl std::fmt::Debug for ScreenTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stay => f.write_str("Stay"),
            Self::Submit { text } => f.debug_struct("Submit").field("len", &text.len()).finish(),
            Self::ExitGame => f.write_str("ExitGame"),
            Self::OpenSettings => f.write_str("OpenSettings"),
            Self::SaveSettings(settings) => f.debug_tuple("SaveSettings").field(settings).finish(),
            Self::SaveApiKey(_) => f.write_str("SaveApiKey(<redacted>)"),
            Self::CloseOverlay => f.write_str("CloseOverlay"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

/// Trait implemented by each screen and overlay.
///
/// Each screen owns its own state, renders its UI, and handles key events.
/// The controller calls these methods in the event loop.
pub trait Screen {
    /// Renders the screen into the provided [`Frame`].
    fn render(&self, frame: &mut Frame);

    /// Handles a key event and returns the resulting [`ScreenTransition`].
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition;

    /// Feeds wall time elapsed since the previous loop iteration.
    fn on_tick(&mut self, _elapsed: Duration) {}

    /// Receives pasted text. Ignored by default.
    fn on_paste(&mut self, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let shown = format!("{:?}", ScreenTransition::SaveApiKey("sk-SECRET123".into()));
        assert_eq!(shown, "SaveApiKey(<redacted>)");
    }

    #[test]
    fn test_debug_hides_draft_text() {
        let shown = format!("{:?}", ScreenTransition::Submit { text: "bài".into() });
        assert!(!shown.contains("bài"));
    }
}
