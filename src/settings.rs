//! Classroom settings — the student roster and the per-question timer.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Shortest allowed countdown, in seconds.
pub const MIN_TIMER_SECS: u32 = 5;
/// Longest allowed countdown, in seconds.
pub const MAX_TIMER_SECS: u32 = 120;
/// Countdown used when nothing else is configured.
pub const DEFAULT_TIMER_SECS: u32 = 15;

/// Roster used when nothing else is configured.
pub const DEFAULT_STUDENTS: [&str; 5] = [
    "Nguyễn Văn A",
    "Trần Thị B",
    "Lê Văn C",
    "Phạm Thị D",
    "Hoàng Văn E",
];

/// Session-wide classroom settings.
///
/// Passed explicitly into each game controller; there is no global copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(from = "SettingsRecord")]
pub struct AppSettings {
    /// Students who can be called on, in display order.
    students: Vec<String>,
    /// Countdown length in seconds.
    timer: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            students: DEFAULT_STUDENTS.iter().map(|s| s.to_string()).collect(),
            timer: DEFAULT_TIMER_SECS,
        }
    }
}

impl AppSettings {
    /// Creates settings, dropping blank names and clamping the timer.
    #[instrument(skip(students))]
    pub fn new(students: Vec<String>, timer: u32) -> Self {
        let students: Vec<String> = students
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timer = clamp_timer(timer);
        debug!(students = students.len(), timer, "Creating settings");
        Self { students, timer }
    }

    /// Creates settings from a newline-separated roster, as typed in the
    /// settings editor.
    #[instrument(skip(roster))]
    pub fn from_roster(roster: &str, timer: u32) -> Self {
        Self::new(roster.lines().map(str::to_string).collect(), timer)
    }

    /// The roster as newline-separated text, for editing.
    pub fn roster_text(&self) -> String {
        self.students.join("\n")
    }

    /// Countdown length as a `u32`.
    pub fn timer_secs(&self) -> u32 {
        self.timer
    }
}

/// Settings as they appear on the wire, before trimming and clamping.
#[derive(Deserialize)]
struct SettingsRecord {
    students: Vec<String>,
    timer: u32,
}

impl From<SettingsRecord> for AppSettings {
    fn from(record: SettingsRecord) -> Self {
        Self::new(record.students, record.timer)
    }
}

/// Clamps a timer value into the allowed range.
pub fn clamp_timer(secs: u32) -> u32 {
    secs.clamp(MIN_TIMER_SECS, MAX_TIMER_SECS)
}
