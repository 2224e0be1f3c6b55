//! Memory-match controller.
//!
//! Each pair becomes two face-down cards. At most two cards are face-up
//! awaiting resolution; a pair resolves after a short delay, a mismatch
//! after a longer one.

use std::time::Duration;

use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use crate::scheduler::{PlaythroughId, Scheduler};
use crate::schema::Pair;

/// Delay before a matching pair is marked matched.
pub const MATCH_DELAY: Duration = Duration::from_millis(600);
/// Delay before a mismatched pair flips back.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1200);
/// Points for each matched pair.
pub const MATCH_POINTS: u32 = 10;

/// One card on the table.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Card {
    id: String,
    pair_id: String,
    content: String,
    is_flipped: bool,
    is_matched: bool,
}

impl Card {
    fn new(id: String, pair_id: String, content: String) -> Self {
        Self {
            id,
            pair_id,
            content,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether the card's content is visible.
    pub fn is_face_up(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

/// What a flip attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Not allowed: out of range, already face-up or matched, or two cards
    /// already waiting.
    Ignored,
    /// First card of a turn revealed.
    Revealed,
    /// Second card revealed; the two match and will be marked shortly.
    PairFound,
    /// Second card revealed; no match, both will flip back shortly.
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Match(usize, usize),
    Mismatch(usize, usize),
}

/// Memory-match state machine.
#[derive(Debug)]
pub struct MemoryMatch<R> {
    pairs: Vec<Pair>,
    rng: R,
    cards: Vec<Card>,
    face_up: Vec<usize>,
    score: u32,
    moves: u32,
    won: bool,
    playthrough: PlaythroughId,
    scheduler: Scheduler<Resolution>,
}

impl<R: Rng> MemoryMatch<R> {
    /// Deals a shuffled table for `pairs`.
    #[instrument(skip(pairs, rng), fields(pairs = pairs.len()))]
    pub fn new(pairs: Vec<Pair>, rng: R) -> Self {
        let mut game = Self {
            pairs,
            rng,
            cards: Vec::new(),
            face_up: Vec::new(),
            score: 0,
            moves: 0,
            won: false,
            playthrough: PlaythroughId::fresh(),
            scheduler: Scheduler::new(),
        };
        game.deal();
        game
    }

    /// Starts a new play-through with a freshly shuffled table.
    ///
    /// Pending resolutions of the previous play-through never fire.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        let cancelled = self.scheduler.cancel_playthrough(self.playthrough);
        debug!(cancelled, "Restarting memory match");
        self.playthrough = PlaythroughId::fresh();
        self.deal();
    }

    /// Tries to flip the card at `index`.
    #[instrument(skip(self))]
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.face_up.len() >= 2 {
            return FlipOutcome::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return FlipOutcome::Ignored;
        };
        if card.is_flipped || card.is_matched {
            return FlipOutcome::Ignored;
        }
        card.is_flipped = true;
        self.face_up.push(index);

        let [first, second] = self.face_up[..] else {
            return FlipOutcome::Revealed;
        };

        self.moves += 1;
        if self.cards[first].pair_id == self.cards[second].pair_id {
            self.scheduler.schedule(
                self.playthrough,
                MATCH_DELAY,
                Resolution::Match(first, second),
            );
            debug!(moves = self.moves, "Pair found");
            FlipOutcome::PairFound
        } else {
            self.scheduler.schedule(
                self.playthrough,
                MISMATCH_DELAY,
                Resolution::Mismatch(first, second),
            );
            debug!(moves = self.moves, "No match");
            FlipOutcome::NoMatch
        }
    }

    /// Feeds elapsed wall time into pending resolutions.
    pub fn advance(&mut self, elapsed: Duration) {
        for resolution in self.scheduler.advance(elapsed, self.playthrough) {
            self.resolve(resolution);
        }
    }

    /// Cancels pending resolutions. Call when leaving the game.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.scheduler.cancel_playthrough(self.playthrough);
    }

    fn deal(&mut self) {
        let mut cards: Vec<Card> = self
            .pairs
            .iter()
            .flat_map(|pair| {
                [
                    Card::new(
                        format!("{}-left", pair.id()),
                        pair.id().clone(),
                        pair.left().clone(),
                    ),
                    Card::new(
                        format!("{}-right", pair.id()),
                        pair.id().clone(),
                        pair.right().clone(),
                    ),
                ]
            })
            .collect();
        cards.shuffle(&mut self.rng);

        self.cards = cards;
        self.face_up.clear();
        self.score = 0;
        self.moves = 0;
        self.won = self.cards.iter().all(|card| card.is_matched);
        info!(
            playthrough = %self.playthrough,
            cards = self.cards.len(),
            "Memory table dealt"
        );
    }

    fn resolve(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Match(first, second) => {
                for index in [first, second] {
                    if let Some(card) = self.cards.get_mut(index) {
                        card.is_matched = true;
                    }
                }
                self.face_up.clear();
                self.score += MATCH_POINTS;
                if self.cards.iter().all(|card| card.is_matched) {
                    self.won = true;
                    info!(moves = self.moves, score = self.score, "Memory match won");
                }
            }
            Resolution::Mismatch(first, second) => {
                for index in [first, second] {
                    if let Some(card) = self.cards.get_mut(index) {
                        card.is_flipped = false;
                    }
                }
                self.face_up.clear();
            }
        }
    }
}

impl<R> MemoryMatch<R> {
    /// Cards in table order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Points so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Completed turns (pairs of flips).
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Whether every card is matched.
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Cards face-up and waiting for resolution.
    pub fn face_up_count(&self) -> usize {
        self.face_up.len()
    }

    /// Whether a resolution is pending.
    pub fn is_resolving(&self) -> bool {
        self.face_up.len() == 2
    }

    /// Current play-through.
    pub fn playthrough(&self) -> PlaythroughId {
        self.playthrough
    }
}
