//! Memory-match screen — a grid of face-down cards.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::{debug, info, instrument};

use crate::games::{Card, FlipOutcome, MemoryMatch};
use crate::schema::Pair;
use crate::tui::screen::{Screen, ScreenTransition};

/// Cards per row.
pub const GRID_COLUMNS: usize = 4;

/// State for the memory-match screen.
#[derive(Debug)]
pub struct MemoryMatchScreen {
    title: String,
    game: MemoryMatch<StdRng>,
    selected: usize,
}

impl MemoryMatchScreen {
    /// Creates the screen and deals the table for `pairs`.
    #[instrument(skip(pairs, rng), fields(pairs = pairs.len()))]
    pub fn new(title: String, pairs: Vec<Pair>, rng: StdRng) -> Self {
        info!(title = %title, "Initializing MemoryMatchScreen");
        Self {
            title,
            game: MemoryMatch::new(pairs, rng),
            selected: 0,
        }
    }

    /// Cancels pending resolutions before the screen is dropped.
    pub fn teardown(&mut self) {
        self.game.teardown();
    }

    fn move_selection(&mut self, dx: isize, dy: isize) {
        let count = self.game.cards().len();
        if count == 0 {
            return;
        }
        let columns = GRID_COLUMNS as isize;
        let rows = count.div_ceil(GRID_COLUMNS) as isize;
        let row = (self.selected as isize / columns + dy).rem_euclid(rows);
        let col = (self.selected as isize % columns + dx).rem_euclid(columns);
        let next = (row * columns + col) as usize;
        self.selected = next.min(count - 1);
    }

    fn card_style(&self, index: usize, card: &Card) -> Style {
        let base = if *card.is_matched() {
            Style::default().fg(Color::Green)
        } else if *card.is_flipped() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Blue)
        };
        if index == self.selected {
            base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            base
        }
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let cards = self.game.cards();
        let rows = cards.len().div_ceil(GRID_COLUMNS).max(1);
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(area);

        for (row, chunk) in cards.chunks(GRID_COLUMNS).enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![
                    Constraint::Ratio(1, GRID_COLUMNS as u32);
                    GRID_COLUMNS
                ])
                .split(row_areas[row]);
            for (col, card) in chunk.iter().enumerate() {
                let index = row * GRID_COLUMNS + col;
                let text = if card.is_face_up() {
                    card.content().clone()
                } else {
                    "?".to_string()
                };
                let cell = Paragraph::new(text)
                    .style(self.card_style(index, card))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(cell, cells[col]);
            }
        }
    }
}

impl Screen for MemoryMatchScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(format!(
            "{}   |   Điểm: {}   |   Lượt: {}",
            self.title,
            self.game.score(),
            self.game.moves()
        ))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        if self.game.is_won() {
            let body = Paragraph::new(vec![
                Line::from(""),
                Line::from("Chúc mừng! Con đã tìm được tất cả các cặp."),
                Line::from(""),
                Line::from(format!("Số lượt: {}", self.game.moves())),
            ])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(body, chunks[1]);
        } else {
            self.render_grid(frame, chunks[1]);
        }

        let help_text = if self.game.is_won() {
            "r: Chơi lại | Esc: Thoát"
        } else {
            "←↑↓→: Chọn thẻ | Enter / Space: Lật | F2: Cài đặt | Esc: Thoát"
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);
    }

    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition {
        match key.code {
            KeyCode::Left => self.move_selection(-1, 0),
            KeyCode::Right => self.move_selection(1, 0),
            KeyCode::Up => self.move_selection(0, -1),
            KeyCode::Down => self.move_selection(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let outcome = self.game.flip(self.selected);
                if outcome != FlipOutcome::Ignored {
                    debug!(index = self.selected, outcome = ?outcome, "Card flipped");
                }
            }
            KeyCode::Char('r') if self.game.is_won() => {
                self.game.restart();
                self.selected = 0;
            }
            KeyCode::Esc => {
                info!("Leaving memory match");
                return ScreenTransition::ExitGame;
            }
            _ => {}
        }
        ScreenTransition::Stay
    }

    fn on_tick(&mut self, elapsed: Duration) {
        self.game.advance(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;

    fn screen(pairs: usize) -> MemoryMatchScreen {
        let pairs = (0..pairs)
            .map(|i| Pair::new(format!("p{i}"), format!("L{i}"), format!("R{i}")))
            .collect();
        MemoryMatchScreen::new("Ghép cặp".into(), pairs, StdRng::seed_from_u64(1))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_selection_wraps_within_grid() {
        let mut screen = screen(4);
        screen.handle_key(key(KeyCode::Left));
        assert_eq!(screen.selected, 3);
        screen.handle_key(key(KeyCode::Down));
        assert_eq!(screen.selected, 7);
        screen.handle_key(key(KeyCode::Down));
        assert_eq!(screen.selected, 3);
    }

    #[test]
    fn test_enter_flips_selected_card() {
        let mut screen = screen(2);
        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(screen.game.face_up_count(), 1);
        assert!(screen.game.cards()[0].is_face_up());
    }
}
