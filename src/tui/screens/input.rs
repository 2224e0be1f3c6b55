//! Input screen — type or paste the lesson text.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{debug, info, instrument};

use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::text_buffer::TextBuffer;

/// State for the input screen.
#[derive(Debug)]
pub struct InputScreen {
    buffer: TextBuffer,
    provider_label: String,
}

impl InputScreen {
    /// Creates the screen holding `draft`, with the cursor at the end.
    #[instrument(skip(draft), fields(len = draft.len()))]
    pub fn new(draft: &str, provider_label: String) -> Self {
        debug!("Initializing InputScreen");
        Self {
            buffer: TextBuffer::new(draft),
            provider_label,
        }
    }

    /// Current draft.
    pub fn draft(&self) -> &str {
        self.buffer.text()
    }

    #[instrument(skip(self))]
    fn submit(&self) -> ScreenTransition {
        if self.buffer.is_blank() {
            debug!("Submit ignored, draft is empty");
            return ScreenTransition::Stay;
        }
        info!(len = self.buffer.text().len(), "Submitting lesson text");
        ScreenTransition::Submit {
            text: self.buffer.text().to_string(),
        }
    }
}

impl Screen for InputScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new("Game Master — Tạo trò chơi từ bài học")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let editor_block = Block::default()
            .borders(Borders::ALL)
            .title(" Nội dung bài học ")
            .title_bottom(format!(" {} ", self.provider_label));
        let inner = editor_block.inner(chunks[1]);

        let (row, col) = self.buffer.cursor_row_col();
        let scroll = row.saturating_sub(inner.height.saturating_sub(1) as usize);
        let editor = Paragraph::new(self.buffer.text())
            .block(editor_block)
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(editor, chunks[1]);

        let cursor_y = inner.y + u16::try_from(row - scroll).unwrap_or(0);
        let cursor_x = inner.x + u16::try_from(col).unwrap_or(0);
        frame.set_cursor_position(Position::new(
            cursor_x.min(inner.right().saturating_sub(1)),
            cursor_y.min(inner.bottom().saturating_sub(1)),
        ));

        let help = Paragraph::new("F5 / Ctrl+G: Tạo trò chơi | F2: Cài đặt | Esc: Thoát")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);
    }

    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(5) => self.submit(),
            KeyCode::Char('g') if ctrl => self.submit(),
            KeyCode::Esc => ScreenTransition::Quit,
            KeyCode::Enter => {
                self.buffer.insert('\n');
                ScreenTransition::Stay
            }
            KeyCode::Char(c) if !ctrl => {
                self.buffer.insert(c);
                ScreenTransition::Stay
            }
            KeyCode::Tab => {
                self.buffer.insert_str("    ");
                ScreenTransition::Stay
            }
            KeyCode::Backspace => {
                self.buffer.backspace();
                ScreenTransition::Stay
            }
            KeyCode::Delete => {
                self.buffer.delete();
                ScreenTransition::Stay
            }
            KeyCode::Left => {
                self.buffer.left();
                ScreenTransition::Stay
            }
            KeyCode::Right => {
                self.buffer.right();
                ScreenTransition::Stay
            }
            KeyCode::Home => {
                self.buffer.home();
                ScreenTransition::Stay
            }
            KeyCode::End => {
                self.buffer.end();
                ScreenTransition::Stay
            }
            _ => ScreenTransition::Stay,
        }
    }

    fn on_paste(&mut self, text: &str) {
        debug!(len = text.len(), "Pasted into draft");
        self.buffer.insert_str(text);
    }
}
