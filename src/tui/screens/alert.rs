//! Blocking alert overlay. Any key dismisses it.

use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::instrument;

use crate::tui::layout::centered_rect;
use crate::tui::screen::{Screen, ScreenTransition};

/// State for the alert overlay.
#[derive(Debug)]
pub struct AlertScreen {
    message: String,
}

impl AlertScreen {
    /// Creates an alert showing `message`.
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Screen for AlertScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = centered_rect(60, 7, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(vec![
            Line::from(self.message.as_str()),
            Line::from(""),
            Line::from("Nhấn phím bất kỳ để tiếp tục").style(Style::default().fg(Color::DarkGray)),
        ])
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Lỗi "));
        frame.render_widget(body, area);
    }

    fn handle_key(&mut self, _key: KeyEvent) -> ScreenTransition {
        ScreenTransition::CloseOverlay
    }
}
