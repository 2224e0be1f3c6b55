//! Game controllers.
//!
//! Controllers are plain state machines. They own their state for one
//! play-through, take time in through `advance`, and never touch the terminal.

mod memory_match;
mod quiz_show;

pub use memory_match::{Card, FlipOutcome, MATCH_DELAY, MATCH_POINTS, MISMATCH_DELAY, MemoryMatch};
pub use quiz_show::{PRAISE_FALLBACK, QuizPhase, QuizShow, TICK, option_label};
