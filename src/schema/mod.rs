//! Game descriptor schema shared by the generator, the shell and the games.

mod error;
mod types;
mod validate;

pub use error::SchemaError;
pub use types::{BubbleItem, GameConfig, GameItems, GameKind, GameRoute, Pair, Question};
pub use validate::{OPTIONS_PER_QUESTION, parse_game_config, strip_code_fence, validate_object};
