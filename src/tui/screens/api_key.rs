//! API-key overlay — shown when the generation service rejects the key.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{info, instrument};

use crate::tui::layout::centered_rect;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::text_buffer::TextBuffer;

/// State for the API-key overlay.
pub struct ApiKeyScreen {
    env_var: String,
    key: TextBuffer,
}

impl std::fmt::Debug for ApiKeyScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyScreen")
            .field("env_var", &self.env_var)
            .field("typed", &self.key.text().chars().count())
            .finish()
    }
}

impl ApiKeyScreen {
    /// Creates the overlay for the provider whose key lives in `env_var`.
    #[instrument]
    pub fn new(env_var: String) -> Self {
        Self {
            env_var,
            key: TextBuffer::default(),
        }
    }

    fn masked(&self) -> String {
        "•".repeat(self.key.text().chars().count())
    }
}

impl Screen for ApiKeyScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = centered_rect(70, 9, frame.area());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from("Khoá API không hợp lệ hoặc chưa được cấu hình."),
            Line::from(format!("Nhập khoá mới ({}):", self.env_var)),
            Line::from(""),
            Line::from(self.masked()).style(Style::default().fg(Color::Yellow)),
            Line::from(""),
            Line::from("Enter: Lưu | Esc: Bỏ qua").style(Style::default().fg(Color::DarkGray)),
        ];
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Khoá API ")
                    .border_style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(body, area);
    }

    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition {
        match key.code {
            KeyCode::Esc => ScreenTransition::CloseOverlay,
            KeyCode::Enter if !self.key.is_blank() => {
                info!("API key entered");
                ScreenTransition::SaveApiKey(self.key.text().trim().to_string())
            }
            KeyCode::Char(c) => {
                self.key.insert(c);
                ScreenTransition::Stay
            }
            KeyCode::Backspace => {
                self.key.backspace();
                ScreenTransition::Stay
            }
            _ => ScreenTransition::Stay,
        }
    }

    fn on_paste(&mut self, text: &str) {
        self.key.insert_str(text.trim());
    }
}
