//! Quiz-show screen — one question at a time with a countdown.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};
use tracing::{debug, info, instrument};

use crate::games::{QuizPhase, QuizShow, option_label};
use crate::schema::Question;
use crate::settings::AppSettings;
use crate::tui::layout::fit_to_width;
use crate::tui::screen::{Screen, ScreenTransition};

/// State for the quiz-show screen.
#[derive(Debug)]
pub struct QuizShowScreen {
    title: String,
    show: QuizShow<StdRng>,
}

impl QuizShowScreen {
    /// Creates the screen for `questions` under `settings`.
    #[instrument(skip(questions, settings, rng), fields(questions = questions.len()))]
    pub fn new(title: String, questions: Vec<Question>, settings: AppSettings, rng: StdRng) -> Self {
        info!(title = %title, "Initializing QuizShowScreen");
        Self {
            title,
            show: QuizShow::new(questions, settings, rng),
        }
    }

    /// Passes new settings to the running show.
    pub fn apply_settings(&mut self, settings: AppSettings) {
        self.show.apply_settings(settings);
    }

    /// Cancels pending ticks before the screen is dropped.
    pub fn teardown(&mut self) {
        self.show.teardown();
    }

    /// Option picked by `code`: its letter or its 1-based digit. Keys past
    /// the last option are left for the other bindings.
    fn option_index(&self, code: KeyCode) -> Option<usize> {
        let count = self.show.current_question()?.options().len();
        let index = match code {
            KeyCode::Char(c @ 'a'..='z') => c as usize - 'a' as usize,
            KeyCode::Char(c @ 'A'..='Z') => c as usize - 'A' as usize,
            KeyCode::Char(c @ '1'..='9') => c as usize - '1' as usize,
            _ => return None,
        };
        (index < count).then_some(index)
    }

    fn render_finished(&self, frame: &mut Frame) {
        let area = frame.area();
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Hoàn thành!",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "Điểm: {} / {}",
                self.show.score(),
                self.show.total()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter / Esc: Quay lại",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title)),
            );
        frame.render_widget(body, area);
    }

    fn option_style(&self, option: &str, answer: &str) -> Style {
        match self.show.phase() {
            QuizPhase::Answered { selection, correct } => {
                let picked = selection.as_deref() == Some(option);
                if option == answer {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else if picked && !*correct {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            }
            _ => Style::default(),
        }
    }
}

impl Screen for QuizShowScreen {
    #[instrument(skip(self, frame))]
    fn render(&self, frame: &mut Frame) {
        let Some(question) = self.show.current_question() else {
            self.render_finished(frame);
            return;
        };

        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(6),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(format!(
            "{}   |   Câu {}/{}   |   Điểm: {}",
            fit_to_width(&self.title, chunks[0].width.saturating_sub(30) as usize),
            self.show.index() + 1,
            self.show.total(),
            self.show.score()
        ))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let student = Paragraph::new(format!(
            "Mời bạn: {}",
            self.show.student().unwrap_or("—")
        ))
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(student, chunks[1]);

        let timer = self.show.settings().timer_secs().max(1);
        let ratio = f64::from(self.show.time_left().min(timer)) / f64::from(timer);
        let gauge_color = if self.show.is_armed() && self.show.time_left() <= 5 {
            Color::Red
        } else {
            Color::Green
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Thời gian "))
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(ratio)
            .label(format!("{} s", self.show.time_left()));
        frame.render_widget(gauge, chunks[2]);

        let mut items = vec![
            ListItem::new(Line::from(Span::styled(
                question.text().clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))),
            ListItem::new(""),
        ];
        items.extend(question.options().iter().enumerate().map(|(i, option)| {
            ListItem::new(format!("  {}. {}", option_label(i), option))
                .style(self.option_style(option, question.answer()))
        }));
        let list = List::new(items).block(Block::default().borders(Borders::ALL));
        frame.render_widget(list, chunks[3]);

        let (feedback, color) = match self.show.phase() {
            QuizPhase::Answered { correct: true, .. } => (
                self.show.explanation().unwrap_or_default().to_string(),
                Color::Green,
            ),
            QuizPhase::Answered {
                selection: None, ..
            } => ("Hết giờ!".to_string(), Color::Red),
            QuizPhase::Answered { .. } => ("Chưa đúng rồi!".to_string(), Color::Red),
            QuizPhase::Armed => ("Đang tính giờ...".to_string(), Color::Yellow),
            _ => (String::new(), Color::White),
        };
        let feedback = Paragraph::new(feedback)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Giải thích "));
        frame.render_widget(feedback, chunks[4]);

        let help_text = if self.show.is_answered() {
            "Enter / n: Câu tiếp | F2: Cài đặt | Esc: Thoát"
        } else {
            "s / Space: Bắt đầu | A, B, … / 1, 2, …: Chọn | r: Đổi bạn | F2: Cài đặt | Esc: Thoát"
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[5]);
    }

    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> ScreenTransition {
        if self.show.is_finished() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => ScreenTransition::ExitGame,
                _ => ScreenTransition::Stay,
            };
        }

        if let Some(index) = self.option_index(key.code) {
            if let Some(correct) = self.show.select_index(index) {
                debug!(index, correct, "Option selected");
            }
            return ScreenTransition::Stay;
        }

        match key.code {
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                self.show.start_timer();
                ScreenTransition::Stay
            }
            KeyCode::Char('r') => {
                self.show.reroll_student();
                ScreenTransition::Stay
            }
            KeyCode::Enter | KeyCode::Char('n') => {
                self.show.next();
                ScreenTransition::Stay
            }
            KeyCode::Esc => {
                info!("Leaving quiz show");
                ScreenTransition::ExitGame
            }
            _ => ScreenTransition::Stay,
        }
    }

    fn on_tick(&mut self, elapsed: Duration) {
        self.show.advance(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn screen() -> QuizShowScreen {
        let question = Question::new(
            "q1".into(),
            "2 + 2 = ?".into(),
            vec!["3".into(), "4".into(), "5".into(), "6".into()],
            "4".into(),
            None,
        );
        QuizShowScreen::new(
            "Toán".into(),
            vec![question],
            AppSettings::default(),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_letter_key_selects_option() {
        let mut screen = screen();
        screen.handle_key(key('b'));
        assert_eq!(screen.show.score(), 1);
        screen.handle_key(key('n'));
        assert!(screen.show.is_finished());
        assert!(matches!(
            screen.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            ScreenTransition::ExitGame
        ));
    }

    #[test]
    fn test_digit_key_selects_option() {
        let mut screen = screen();
        screen.handle_key(key('1'));
        assert_eq!(screen.show.score(), 0);
        assert!(screen.show.is_answered());
    }

    fn green() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    #[test]
    fn test_wrong_pick_reveals_correct_option() {
        let mut screen = screen();
        screen.handle_key(key('a'));
        assert_eq!(screen.option_style("4", "4"), green());
        assert_eq!(
            screen.option_style("3", "4"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        );
        assert_eq!(
            screen.option_style("5", "4"),
            Style::default().fg(Color::DarkGray)
        );
    }

    #[test]
    fn test_timeout_reveals_correct_option() {
        let mut screen = screen();
        screen.handle_key(key('s'));
        screen.on_tick(Duration::from_secs(u64::from(
            AppSettings::default().timer_secs(),
        )));
        assert_eq!(
            screen.show.phase(),
            &QuizPhase::Answered {
                selection: None,
                correct: false
            }
        );
        assert_eq!(screen.option_style("4", "4"), green());
        assert_eq!(
            screen.option_style("3", "4"),
            Style::default().fg(Color::DarkGray)
        );
    }

    #[test]
    fn test_option_before_answer_is_plain() {
        let screen = screen();
        assert_eq!(screen.option_style("4", "4"), Style::default());
    }

    #[test]
    fn test_fifth_option_is_selectable() {
        let question = Question::new(
            "q1".into(),
            "Chọn số chẵn lớn nhất".into(),
            vec!["1".into(), "2".into(), "3".into(), "5".into(), "8".into()],
            "8".into(),
            None,
        );
        let mut screen = QuizShowScreen::new(
            "Toán".into(),
            vec![question],
            AppSettings::default(),
            StdRng::seed_from_u64(7),
        );
        assert_eq!(screen.option_index(KeyCode::Char('f')), None);
        assert_eq!(screen.option_index(KeyCode::Char('6')), None);
        screen.handle_key(key('e'));
        assert_eq!(screen.show.score(), 1);
    }

    #[test]
    fn test_command_keys_past_last_option_still_work() {
        let mut screen = screen();
        screen.handle_key(key('s'));
        assert!(screen.show.is_armed());
        assert!(!screen.show.is_answered());
    }
}
