//! Game descriptor types produced by the generation service.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize, Serializer};
use strum::EnumString;
use tracing::instrument;

/// Which controller plays a given [`GameKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameRoute {
    /// Multiple-choice quiz show with a countdown.
    QuizShow,
    /// Memory card matching.
    MemoryMatch,
}

/// Game type tag returned by the generation service.
///
/// Any tag outside the six known ones parses into
/// [`GameKind::Unrecognized`] and is played as a quiz show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameKind {
    /// "Rung chuông vàng" multiple-choice quiz show.
    RungChuongVang,
    /// Memory matching of pairs.
    Memory,
    /// Two lists to be matched against each other.
    Matching,
    /// Pick the correct bubbles out of a set.
    BubblePop,
    /// Open questions hidden in a box.
    WhatsInBox,
    /// Guess the keyword from an image description.
    GuessImage,
    /// A tag this application does not know.
    #[strum(default)]
    Unrecognized(String),
}

impl GameKind {
    /// The six tags the generation prompt offers.
    pub const SUPPORTED: [GameKind; 6] = [
        GameKind::RungChuongVang,
        GameKind::Memory,
        GameKind::Matching,
        GameKind::BubblePop,
        GameKind::WhatsInBox,
        GameKind::GuessImage,
    ];

    /// Parses a wire tag. Never fails.
    #[instrument]
    pub fn from_tag(tag: &str) -> Self {
        tag.trim()
            .parse()
            .unwrap_or_else(|_| GameKind::Unrecognized(tag.to_string()))
    }

    /// Returns the wire tag.
    pub fn tag(&self) -> &str {
        match self {
            Self::RungChuongVang => "RUNG_CHUONG_VANG",
            Self::Memory => "MEMORY",
            Self::Matching => "MATCHING",
            Self::BubblePop => "BUBBLE_POP",
            Self::WhatsInBox => "WHATS_IN_BOX",
            Self::GuessImage => "GUESS_IMAGE",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Controller used to play this kind. Everything but `MEMORY` falls back
    /// to the quiz show.
    pub fn route(&self) -> GameRoute {
        match self {
            Self::Memory => GameRoute::MemoryMatch,
            _ => GameRoute::QuizShow,
        }
    }

    /// Whether this kind carries left/right pairs as items.
    pub fn has_pair_items(&self) -> bool {
        matches!(self, Self::Memory | Self::Matching)
    }
}

impl Serialize for GameKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Question {
    id: String,
    text: String,
    options: Vec<String>,
    answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl Question {
    /// Whether `option` is exactly the correct answer.
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.answer
    }
}

/// Two related strings to be matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Pair {
    id: String,
    left: String,
    right: String,
}

/// One bubble in a bubble-pop set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct BubbleItem {
    id: String,
    text: String,
    #[serde(rename = "isCorrect")]
    is_correct: bool,
}

/// Item payload, shaped by the game kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GameItems {
    /// Quiz-shaped items.
    Questions(Vec<Question>),
    /// Pair-shaped items.
    Pairs(Vec<Pair>),
    /// Bubble-pop items.
    Bubbles(Vec<BubbleItem>),
}

impl GameItems {
    /// Questions, or an empty slice for other shapes.
    pub fn questions(&self) -> &[Question] {
        match self {
            Self::Questions(questions) => questions,
            _ => &[],
        }
    }

    /// Pairs, or an empty slice for other shapes.
    pub fn pairs(&self) -> &[Pair] {
        match self {
            Self::Pairs(pairs) => pairs,
            _ => &[],
        }
    }

    /// Bubbles, or an empty slice for other shapes.
    pub fn bubbles(&self) -> &[BubbleItem] {
        match self {
            Self::Bubbles(bubbles) => bubbles,
            _ => &[],
        }
    }

    /// Number of items regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            Self::Questions(v) => v.len(),
            Self::Pairs(v) => v.len(),
            Self::Bubbles(v) => v.len(),
        }
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated game definition.
///
/// Built once per successful generation and replaced wholesale by the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct GameConfig {
    #[serde(rename = "type")]
    kind: GameKind,
    title: String,
    description: String,
    reason: String,
    items: GameItems,
}

impl GameConfig {
    /// Controller that should play this config.
    pub fn route(&self) -> GameRoute {
        self.kind.route()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_parse() {
        for kind in GameKind::SUPPORTED {
            assert_eq!(GameKind::from_tag(kind.tag()), kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        let kind = GameKind::from_tag("CROSSWORD");
        assert_eq!(kind, GameKind::Unrecognized("CROSSWORD".to_string()));
        assert_eq!(kind.tag(), "CROSSWORD");
        assert_eq!(kind.route(), GameRoute::QuizShow);
    }

    #[test]
    fn test_only_memory_routes_to_memory_match() {
        assert_eq!(GameKind::Memory.route(), GameRoute::MemoryMatch);
        assert_eq!(GameKind::Matching.route(), GameRoute::QuizShow);
        assert_eq!(GameKind::RungChuongVang.route(), GameRoute::QuizShow);
    }

    #[test]
    fn test_items_accessors_by_shape() {
        let items = GameItems::Pairs(vec![Pair::new(
            "p1".to_string(),
            "cat".to_string(),
            "con mèo".to_string(),
        )]);
        assert_eq!(items.pairs().len(), 1);
        assert!(items.questions().is_empty());
        assert!(items.bubbles().is_empty());
        assert!(!items.is_empty());
    }
}
