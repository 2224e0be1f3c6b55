//! Quiz-show controller tests with a seeded random source.

use std::time::Duration;

use game_master::{AppSettings, PRAISE_FALLBACK, QuizPhase, QuizShow, Question, TICK};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn question(id: &str, answer: &str, explanation: Option<&str>) -> Question {
    Question::new(
        id.to_string(),
        format!("Câu hỏi {id}?"),
        vec!["Hà Nội".into(), "Huế".into(), "Đà Nẵng".into(), "TP.HCM".into()],
        answer.to_string(),
        explanation.map(str::to_string),
    )
}

fn settings(timer: u32) -> AppSettings {
    AppSettings::new(vec!["An".into(), "Bình".into(), "Chi".into()], timer)
}

fn show(questions: Vec<Question>, timer: u32) -> QuizShow<StdRng> {
    QuizShow::new(questions, settings(timer), StdRng::seed_from_u64(42))
}

#[test]
fn test_first_round_is_idle_with_a_student() {
    let show = show(vec![question("q1", "Hà Nội", None)], 15);
    assert_eq!(show.phase(), &QuizPhase::Idle);
    assert_eq!(show.time_left(), 15);
    assert!(["An", "Bình", "Chi"].contains(&show.student().unwrap()));
}

#[test]
fn test_only_the_answer_scores() {
    for (i, option) in ["Hà Nội", "Huế", "Đà Nẵng", "TP.HCM"].iter().enumerate() {
        let mut show = show(vec![question("q1", "Huế", None)], 15);
        let correct = show.select(option).expect("accepted");
        assert_eq!(correct, i == 1);
        assert_eq!(show.score(), u32::from(i == 1));
    }
}

#[test]
fn test_second_selection_is_ignored() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 15);
    assert_eq!(show.select("Huế"), Some(false));
    assert_eq!(show.select("Hà Nội"), None);
    assert_eq!(show.score(), 0);
    assert_eq!(
        show.phase(),
        &QuizPhase::Answered {
            selection: Some("Huế".to_string()),
            correct: false
        }
    );
}

#[test]
fn test_explanation_only_after_correct_answer() {
    let mut right = show(vec![question("q1", "Hà Nội", Some("Thủ đô là Hà Nội."))], 15);
    assert!(right.explanation().is_none());
    right.select_index(0);
    assert_eq!(right.explanation(), Some("Thủ đô là Hà Nội."));

    let mut wrong = show(vec![question("q1", "Hà Nội", Some("Thủ đô là Hà Nội."))], 15);
    wrong.select_index(2);
    assert!(wrong.explanation().is_none());
}

#[test]
fn test_missing_explanation_uses_praise() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 15);
    show.select_index(0);
    assert_eq!(show.explanation(), Some(PRAISE_FALLBACK));
}

#[test]
fn test_countdown_ticks_once_per_second() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    assert!(show.start_timer());
    assert!(show.is_armed());

    show.advance(Duration::from_millis(999));
    assert_eq!(show.time_left(), 10);
    show.advance(Duration::from_millis(1));
    assert_eq!(show.time_left(), 9);
    show.advance(Duration::from_secs(3));
    assert_eq!(show.time_left(), 6);
}

#[test]
fn test_timeout_resolves_incorrect() {
    let mut show = show(vec![question("q1", "Hà Nội", Some("Giải thích"))], 5);
    show.start_timer();
    for _ in 0..5 {
        show.advance(TICK);
    }

    assert_eq!(show.time_left(), 0);
    assert_eq!(
        show.phase(),
        &QuizPhase::Answered {
            selection: None,
            correct: false
        }
    );
    assert_eq!(show.score(), 0);
    assert!(show.explanation().is_none());

    show.advance(Duration::from_secs(10));
    assert_eq!(show.time_left(), 0);
    assert_eq!(show.select("Hà Nội"), None);
}

#[test]
fn test_selection_stops_countdown() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    show.start_timer();
    show.advance(Duration::from_secs(2));
    show.select_index(0);
    show.advance(Duration::from_secs(5));
    assert_eq!(show.time_left(), 8);
}

#[test]
fn test_selection_accepted_before_start() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    assert_eq!(show.select_index(0), Some(true));
    assert!(!show.start_timer(), "round already answered");
}

#[test]
fn test_next_requires_answer_and_stops_at_end() {
    let mut show = show(
        vec![question("q1", "Hà Nội", None), question("q2", "Huế", None)],
        10,
    );
    assert!(!show.next(), "cannot skip an unanswered round");

    show.select("Hà Nội");
    assert!(show.next());
    assert_eq!(show.index(), 1);
    assert_eq!(show.phase(), &QuizPhase::Idle);
    assert_eq!(show.time_left(), 10);

    show.select("Huế");
    assert!(show.next());
    assert!(show.is_finished());
    assert_eq!(show.index(), 1);
    assert_eq!(show.score(), 2);
    assert!(show.current_question().is_none());

    assert!(!show.next());
    assert_eq!(show.index(), 1);
}

#[test]
fn test_reroll_only_before_answer() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    show.start_timer();
    show.advance(Duration::from_secs(1));
    assert!(show.reroll_student());
    assert_eq!(show.time_left(), 9, "reroll does not touch the timer");
    assert!(show.is_armed());

    show.select_index(0);
    assert!(!show.reroll_student());
    assert_eq!(show.score(), 1);
}

#[test]
fn test_reroll_always_picks_from_roster() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    for _ in 0..20 {
        show.reroll_student();
        assert!(["An", "Bình", "Chi"].contains(&show.student().unwrap()));
    }
}

#[test]
fn test_new_settings_apply_to_next_start_only() {
    let mut show = show(
        vec![question("q1", "Hà Nội", None), question("q2", "Huế", None)],
        10,
    );
    show.start_timer();
    show.advance(Duration::from_secs(2));

    show.apply_settings(AppSettings::new(vec!["Dũng".into()], 30));
    assert_eq!(show.time_left(), 8, "running countdown keeps its value");

    show.select_index(0);
    show.next();
    assert_eq!(show.time_left(), 30);
    assert_eq!(show.student(), Some("Dũng"));
}

#[test]
fn test_empty_roster_keeps_previous_pick() {
    let mut show = show(
        vec![question("q1", "Hà Nội", None), question("q2", "Huế", None)],
        10,
    );
    let before = show.student().map(str::to_string);
    show.apply_settings(AppSettings::new(Vec::new(), 10));
    show.select_index(0);
    show.next();
    assert_eq!(show.student().map(str::to_string), before);
}

#[test]
fn test_empty_question_list_is_finished() {
    let mut show = show(Vec::new(), 10);
    assert!(show.is_finished());
    assert_eq!(show.total(), 0);
    assert!(!show.start_timer());
    assert_eq!(show.select("Hà Nội"), None);
}

#[test]
fn test_teardown_cancels_countdown() {
    let mut show = show(vec![question("q1", "Hà Nội", None)], 10);
    show.start_timer();
    show.teardown();
    show.advance(Duration::from_secs(20));
    assert_eq!(show.time_left(), 10);
}
