//! Loading screen — shown while the generation call is in flight.

use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use tracing::instrument;

use crate::tui::layout::centered_rect;
use crate::tui::screen::{Screen, ScreenTransition};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const FRAME_TIME: Duration = Duration::from_millis(100);

/// State for the loading screen.
#[derive(Debug, Default)]
pub struct LoadingScreen {
    elapsed: Duration,
}

impl LoadingScreen {
    /// Creates the screen.
    pub fn new() -> Self {
        Self::default()
    }

    fn spinner(&self) -> char {
        let frame = (self.elapsed.as_millis() / FRAME_TIME.as_millis()) as usize;
        SPINNER[frame % SPINNER.len()]
    }
}

impl Screen for LoadingScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = centered_rect(60, 5, frame.area());
        let lines = vec![
            Line::from(format!("{} Đang tạo trò chơi...", self.spinner())),
            Line::from(format!("{} giây", self.elapsed.as_secs())),
        ];
        let body = Paragraph::new(lines)
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    fn handle_key(&mut self, _key: KeyEvent) -> ScreenTransition {
        ScreenTransition::Stay
    }

    fn on_tick(&mut self, elapsed: Duration) {
        self.elapsed += elapsed;
    }
}
