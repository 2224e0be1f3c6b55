//! Memory-match controller tests with a seeded random source.

use std::collections::HashMap;
use std::time::Duration;

use game_master::{
    FlipOutcome, MATCH_DELAY, MATCH_POINTS, MISMATCH_DELAY, MemoryMatch, Pair, parse_game_config,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn pairs(n: usize) -> Vec<Pair> {
    (1..=n)
        .map(|i| Pair::new(format!("p{i}"), format!("word{i}"), format!("từ{i}")))
        .collect()
}

fn game(n: usize) -> MemoryMatch<StdRng> {
    MemoryMatch::new(pairs(n), StdRng::seed_from_u64(3))
}

/// Indices of the two cards of `pair_id`.
fn positions(game: &MemoryMatch<StdRng>, pair_id: &str) -> (usize, usize) {
    let found: Vec<usize> = game
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, card)| card.pair_id() == pair_id)
        .map(|(i, _)| i)
        .collect();
    (found[0], found[1])
}

/// Two indices holding cards of different pairs.
fn mismatch(game: &MemoryMatch<StdRng>) -> (usize, usize) {
    let cards = game.cards();
    let second = cards
        .iter()
        .position(|card| card.pair_id() != cards[0].pair_id())
        .expect("at least two pairs");
    (0, second)
}

#[test]
fn test_two_cards_per_pair() {
    let game = game(5);
    assert_eq!(game.cards().len(), 10);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for card in game.cards() {
        *counts.entry(card.pair_id().as_str()).or_default() += 1;
        assert!(!card.is_face_up());
    }
    assert_eq!(counts.len(), 5);
    assert!(counts.values().all(|&n| n == 2));

    let (left, right) = positions(&game, "p3");
    let mut ids = [game.cards()[left].id().clone(), game.cards()[right].id().clone()];
    ids.sort();
    assert_eq!(ids, ["p3-left".to_string(), "p3-right".to_string()]);
}

#[test]
fn test_shuffle_depends_on_seed() {
    let a = MemoryMatch::new(pairs(8), StdRng::seed_from_u64(1));
    let b = MemoryMatch::new(pairs(8), StdRng::seed_from_u64(1));
    let c = MemoryMatch::new(pairs(8), StdRng::seed_from_u64(2));
    let ids = |g: &MemoryMatch<StdRng>| g.cards().iter().map(|c| c.id().clone()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));
    assert_ne!(ids(&a), ids(&c));
}

#[test]
fn test_match_scores_after_delay() {
    let mut game = game(3);
    let (a, b) = positions(&game, "p1");

    assert_eq!(game.flip(a), FlipOutcome::Revealed);
    assert_eq!(game.flip(b), FlipOutcome::PairFound);
    assert_eq!(game.moves(), 1);
    assert_eq!(game.score(), 0, "score lands after the delay");

    game.advance(MATCH_DELAY - Duration::from_millis(1));
    assert!(!game.cards()[a].is_matched());
    game.advance(Duration::from_millis(1));

    assert!(*game.cards()[a].is_matched() && *game.cards()[b].is_matched());
    assert_eq!(game.score(), MATCH_POINTS);
    assert_eq!(game.moves(), 1);
    assert_eq!(game.face_up_count(), 0);
}

#[test]
fn test_mismatch_flips_back_without_penalty() {
    let mut game = game(3);
    let (a, b) = mismatch(&game);

    game.flip(a);
    assert_eq!(game.flip(b), FlipOutcome::NoMatch);
    assert_eq!(game.moves(), 1);

    game.advance(MATCH_DELAY);
    assert!(game.cards()[a].is_face_up(), "mismatch waits longer than a match");
    game.advance(MISMATCH_DELAY - MATCH_DELAY);

    assert!(!game.cards()[a].is_face_up());
    assert!(!game.cards()[b].is_face_up());
    assert_eq!(game.score(), 0);
    assert_eq!(game.moves(), 1);
}

#[test]
fn test_never_more_than_two_face_up() {
    let mut game = game(4);
    let (a, b) = mismatch(&game);
    game.flip(a);
    game.flip(b);
    assert!(game.is_resolving());

    for i in 0..game.cards().len() {
        assert_eq!(game.flip(i), FlipOutcome::Ignored);
    }
    assert_eq!(game.face_up_count(), 2);
    assert_eq!(
        game.cards().iter().filter(|c| *c.is_flipped()).count(),
        2
    );
}

#[test]
fn test_face_up_or_matched_cards_cannot_flip() {
    let mut game = game(2);
    let (a, b) = positions(&game, "p1");
    game.flip(a);
    assert_eq!(game.flip(a), FlipOutcome::Ignored);
    game.flip(b);
    game.advance(MATCH_DELAY);
    assert_eq!(game.flip(a), FlipOutcome::Ignored);
    assert_eq!(game.flip(99), FlipOutcome::Ignored);
    assert_eq!(game.moves(), 1);
}

#[test]
fn test_won_iff_all_matched() {
    let mut game = game(3);
    for (n, pair) in ["p1", "p2", "p3"].iter().enumerate() {
        assert!(!game.is_won());
        let (a, b) = positions(&game, pair);
        game.flip(a);
        game.flip(b);
        game.advance(MATCH_DELAY);
        assert_eq!(game.score(), MATCH_POINTS * (n as u32 + 1));
    }
    assert!(game.is_won());
    assert!(game.cards().iter().all(|c| *c.is_matched()));
    assert_eq!(game.moves(), 3);
}

#[test]
fn test_restart_discards_pending_resolution() {
    let mut game = game(3);
    let old = game.playthrough();
    let (a, b) = positions(&game, "p1");
    game.flip(a);
    game.flip(b);

    game.restart();
    assert_ne!(game.playthrough(), old);
    game.advance(Duration::from_secs(5));

    assert_eq!(game.score(), 0);
    assert_eq!(game.moves(), 0);
    assert!(game.cards().iter().all(|c| !c.is_face_up()));
    assert_eq!(game.cards().len(), 6);
}

#[test]
fn test_teardown_cancels_resolution() {
    let mut game = game(2);
    let (a, b) = positions(&game, "p1");
    game.flip(a);
    game.flip(b);
    game.teardown();
    game.advance(Duration::from_secs(5));
    assert_eq!(game.score(), 0);
    assert!(game.is_resolving());
}

#[test]
fn test_empty_pairs_are_won_immediately() {
    let game = game(0);
    assert!(game.cards().is_empty());
    assert!(game.is_won());
    assert_eq!(game.moves(), 0);
}

#[test]
fn test_repeated_service_ids_do_not_pair_unrelated_cards() {
    let body = r#"{"type": "MEMORY", "items": [
        {"id": "p2", "left": "cat", "right": "con mèo"},
        {"left": "dog", "right": "con chó"}
    ]}"#;
    let config = parse_game_config(body).expect("valid body");
    let mut game = MemoryMatch::new(config.items().pairs().to_vec(), StdRng::seed_from_u64(3));

    let index_of = |content: &str| {
        game.cards()
            .iter()
            .position(|card| card.content() == content)
            .expect("card dealt")
    };
    let cat = index_of("cat");
    let dog_vi = index_of("con chó");

    assert_eq!(game.flip(cat), FlipOutcome::Revealed);
    assert_eq!(game.flip(dog_vi), FlipOutcome::NoMatch);
}
