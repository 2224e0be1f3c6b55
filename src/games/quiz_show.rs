//! Quiz-show controller ("Rung chuông vàng").
//!
//! One round per question: a student is called on, the host starts the
//! countdown, and the round ends on the first selection or when time runs out.

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use crate::scheduler::{PlaythroughId, Scheduler, TaskId};
use crate::schema::Question;
use crate::settings::AppSettings;

/// Shown when a correct answer has no explanation.
pub const PRAISE_FALLBACK: &str = "Chính xác rồi, con thật là thông minh!";

/// Countdown cadence.
pub const TICK: Duration = Duration::from_secs(1);

/// Display letter for the option at `index` (A, B, C, …).
pub fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map(char::from)
        .unwrap_or('?')
}

/// Phase of the current round, or of the whole show once it is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    /// Question shown, countdown not started.
    Idle,
    /// Countdown running.
    Armed,
    /// Round resolved. `selection` is `None` when time ran out.
    Answered {
        /// The option text chosen, if any.
        selection: Option<String>,
        /// Whether the selection equals the answer.
        correct: bool,
    },
    /// Past the last question.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizEvent {
    Tick,
}

/// Quiz-show state machine.
///
/// Generic over the random source so tests can seed it.
#[derive(Debug)]
pub struct QuizShow<R> {
    questions: Vec<Question>,
    settings: AppSettings,
    rng: R,
    index: usize,
    student: Option<String>,
    time_left: u32,
    phase: QuizPhase,
    score: u32,
    playthrough: PlaythroughId,
    scheduler: Scheduler<QuizEvent>,
    tick_task: Option<TaskId>,
}

impl<R: Rng> QuizShow<R> {
    /// Creates a show over `questions`, calling on a first student.
    ///
    /// An empty question list starts already finished.
    #[instrument(skip(questions, settings, rng), fields(questions = questions.len()))]
    pub fn new(questions: Vec<Question>, settings: AppSettings, rng: R) -> Self {
        let time_left = settings.timer_secs();
        let phase = if questions.is_empty() {
            QuizPhase::Finished
        } else {
            QuizPhase::Idle
        };
        let mut show = Self {
            questions,
            settings,
            rng,
            index: 0,
            student: None,
            time_left,
            phase,
            score: 0,
            playthrough: PlaythroughId::fresh(),
            scheduler: Scheduler::new(),
            tick_task: None,
        };
        show.pick_student();
        info!(playthrough = %show.playthrough, "Quiz show started");
        show
    }

    /// Replaces the settings. The running countdown keeps its value; the
    /// next pick and the next start use the new settings.
    #[instrument(skip(self, settings))]
    pub fn apply_settings(&mut self, settings: AppSettings) {
        debug!(timer = settings.timer_secs(), "Applying settings to quiz show");
        self.settings = settings;
        if self.phase == QuizPhase::Idle {
            self.time_left = self.settings.timer_secs();
        }
    }

    /// Calls on a different random student. Only allowed before answering.
    #[instrument(skip(self))]
    pub fn reroll_student(&mut self) -> bool {
        if !matches!(self.phase, QuizPhase::Idle | QuizPhase::Armed) {
            return false;
        }
        self.pick_student();
        true
    }

    /// Starts the countdown for the current question.
    #[instrument(skip(self), fields(index = self.index))]
    pub fn start_timer(&mut self) -> bool {
        if self.phase != QuizPhase::Idle {
            debug!(phase = ?self.phase, "Timer start ignored");
            return false;
        }
        self.time_left = self.settings.timer_secs();
        self.phase = QuizPhase::Armed;
        self.tick_task = Some(self.scheduler.schedule(self.playthrough, TICK, QuizEvent::Tick));
        info!(seconds = self.time_left, "Countdown started");
        true
    }

    /// Selects the option at `index`. See [`QuizShow::select`].
    pub fn select_index(&mut self, index: usize) -> Option<bool> {
        let option = self.current_question()?.options().get(index)?.clone();
        self.select(&option)
    }

    /// Selects `option` as the answer.
    ///
    /// Returns `Some(correct)` when the selection was accepted, `None` when
    /// the round was already answered or the show is finished.
    #[instrument(skip(self), fields(index = self.index))]
    pub fn select(&mut self, option: &str) -> Option<bool> {
        if !matches!(self.phase, QuizPhase::Idle | QuizPhase::Armed) {
            debug!("Selection ignored, round already resolved");
            return None;
        }
        let correct = self.current_question()?.is_correct(option);
        self.stop_countdown();
        if correct {
            self.score += 1;
        }
        self.phase = QuizPhase::Answered {
            selection: Some(option.to_string()),
            correct,
        };
        info!(correct, score = self.score, "Answer recorded");
        Some(correct)
    }

    /// Moves to the next question, or finishes after the last one.
    ///
    /// Only allowed once the round is answered.
    #[instrument(skip(self), fields(index = self.index))]
    pub fn next(&mut self) -> bool {
        if !matches!(self.phase, QuizPhase::Answered { .. }) {
            return false;
        }
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.time_left = self.settings.timer_secs();
            self.phase = QuizPhase::Idle;
            self.pick_student();
            debug!(index = self.index, "Next question");
        } else {
            self.phase = QuizPhase::Finished;
            info!(score = self.score, total = self.questions.len(), "Quiz show finished");
        }
        true
    }

    /// Feeds elapsed wall time into the countdown.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut budget = elapsed;
        while !budget.is_zero() {
            let events = self.scheduler.step(&mut budget, self.playthrough);
            for event in events {
                self.handle(event);
            }
        }
    }

    /// Cancels pending ticks. Call when leaving the game.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.scheduler.cancel_playthrough(self.playthrough);
        self.tick_task = None;
    }

    fn handle(&mut self, event: QuizEvent) {
        match event {
            QuizEvent::Tick => self.on_tick(),
        }
    }

    fn on_tick(&mut self) {
        if self.phase != QuizPhase::Armed {
            self.tick_task = None;
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.tick_task = None;
            self.phase = QuizPhase::Answered {
                selection: None,
                correct: false,
            };
            info!(index = self.index, "Time is up");
        } else {
            self.tick_task = Some(self.scheduler.schedule(self.playthrough, TICK, QuizEvent::Tick));
        }
    }

    fn stop_countdown(&mut self) {
        if let Some(task) = self.tick_task.take() {
            self.scheduler.cancel(task);
        }
    }

    fn pick_student(&mut self) {
        if let Some(name) = self.settings.students().choose(&mut self.rng) {
            debug!(student = %name, "Student called on");
            self.student = Some(name.clone());
        }
    }
}

impl<R> QuizShow<R> {
    /// The question being played, if the show is not finished.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Finished => None,
            _ => self.questions.get(self.index),
        }
    }

    /// Zero-based index of the current question.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of questions.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds left on the countdown.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Student currently on the spot.
    pub fn student(&self) -> Option<&str> {
        self.student.as_deref()
    }

    /// Current phase.
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    /// Settings in effect.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Whether the show is over.
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    /// Whether the countdown is running.
    pub fn is_armed(&self) -> bool {
        self.phase == QuizPhase::Armed
    }

    /// Whether the current round has been resolved.
    pub fn is_answered(&self) -> bool {
        matches!(self.phase, QuizPhase::Answered { .. })
    }

    /// Explanation to reveal, only after a correct answer.
    pub fn explanation(&self) -> Option<&str> {
        match &self.phase {
            QuizPhase::Answered { correct: true, .. } => Some(
                self.current_question()
                    .and_then(|q| q.explanation().as_deref())
                    .unwrap_or(PRAISE_FALLBACK),
            ),
            _ => None,
        }
    }

    /// Play-through this show belongs to.
    pub fn playthrough(&self) -> PlaythroughId {
        self.playthrough
    }
}
