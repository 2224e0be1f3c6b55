//! Settings overlay — edit the student roster and the countdown length.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::{debug, info, instrument};

use crate::settings::{AppSettings, MAX_TIMER_SECS, MIN_TIMER_SECS, clamp_timer};
use crate::tui::layout::centered_rect;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::text_buffer::TextBuffer;

/// Which field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Roster,
    Timer,
}

/// State for the settings overlay.
#[derive(Debug)]
pub struct SettingsScreen {
    roster: TextBuffer,
    timer: u32,
    focus: Field,
}

impl SettingsScreen {
    /// Creates the overlay pre-populated with the current settings.
    #[instrument(skip(settings))]
    pub fn new(settings: &AppSettings) -> Self {
        debug!("Initializing SettingsScreen");
        Self {
            roster: TextBuffer::new(settings.roster_text()),
            timer: settings.timer_secs(),
            focus: Field::Roster,
        }
    }

    /// The settings as currently edited.
    #[instrument(skip(self))]
    pub fn settings(&self) -> AppSettings {
        AppSettings::from_roster(self.roster.text(), self.timer)
    }

    fn adjust_timer(&mut self, delta: i64) {
        let next = (i64::from(self.timer) + delta).clamp(0, i64::from(u32::MAX));
        self.timer = clamp_timer(u32::try_from(next).unwrap_or(MAX_TIMER_SECS));
        debug!(timer = self.timer, "Timer adjusted");
    }

    fn handle_roster_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.roster.insert('\n'),
            KeyCode::Char(c) => self.roster.insert(c),
            KeyCode::Backspace => self.roster.backspace(),
            KeyCode::Delete => self.roster.delete(),
            KeyCode::Left => self.roster.left(),
            KeyCode::Right => self.roster.right(),
            KeyCode::Home => self.roster.home(),
            KeyCode::End => self.roster.end(),
            _ => {}
        }
    }

    fn handle_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => self.adjust_timer(1),
            KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => self.adjust_timer(-1),
            KeyCode::PageUp => self.adjust_timer(10),
            KeyCode::PageDown => self.adjust_timer(-10),
            _ => {}
        }
    }
}

impl Screen for SettingsScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = centered_rect(70, 20, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Cài đặt ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner);

        let focused = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let roster_style = if self.focus == Field::Roster {
            focused
        } else {
            Style::default()
        };
        let roster = Paragraph::new(self.roster.text()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Danh sách học sinh (mỗi dòng một tên) ")
                .border_style(roster_style),
        );
        frame.render_widget(roster, chunks[0]);

        let timer_style = if self.focus == Field::Timer {
            focused
        } else {
            Style::default()
        };
        let timer = Paragraph::new(format!(
            "◀ {} giây ▶   ({MIN_TIMER_SECS}–{MAX_TIMER_SECS})",
            self.timer
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Thời gian mỗi câu ")
                .border_style(timer_style),
        );
        frame.render_widget(timer, chunks[1]);

        let help = Paragraph::new("Tab: Đổi mục | ↑↓: Chỉnh giờ | Ctrl+S: Lưu | Esc: Huỷ")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[2]);
    }

    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                info!("Settings edit cancelled");
                return ScreenTransition::CloseOverlay;
            }
            KeyCode::Char('s') if ctrl => {
                let settings = self.settings();
                info!(
                    students = settings.students().len(),
                    timer = settings.timer_secs(),
                    "Saving settings"
                );
                return ScreenTransition::SaveSettings(settings);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Field::Roster => Field::Timer,
                    Field::Timer => Field::Roster,
                };
                return ScreenTransition::Stay;
            }
            _ => {}
        }
        match self.focus {
            Field::Roster => self.handle_roster_key(key),
            Field::Timer => self.handle_timer_key(key),
        }
        ScreenTransition::Stay
    }

    fn on_paste(&mut self, text: &str) {
        if self.focus == Field::Roster {
            self.roster.insert_str(text);
        }
    }
}
