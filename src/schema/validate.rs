//! Boundary validation: raw service output into a [`GameConfig`].
//!
//! The service is trusted structurally but not blindly. A body that is not a
//! JSON object is an error. Inside an object everything is lenient: items
//! missing required fields are dropped, missing ids are synthesized and
//! unknown game tags are kept as [`GameKind::Unrecognized`].

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use super::error::SchemaError;
use super::types::{BubbleItem, GameConfig, GameItems, GameKind, Pair, Question};

/// Number of options a quiz question is expected to carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Parses and validates a generated body.
///
/// # Errors
///
/// Returns [`SchemaError`] if the body is empty, is not JSON, or is not a
/// JSON object.
#[instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_game_config(body: &str) -> Result<GameConfig, SchemaError> {
    let body = strip_code_fence(body);
    if body.is_empty() {
        return Err(SchemaError::new("Empty response body"));
    }

    let value: Value = serde_json::from_str(body)?;
    let Value::Object(object) = value else {
        return Err(SchemaError::new("Expected a JSON object at the top level"));
    };

    let config = validate_object(&object);
    info!(
        kind = %config.kind().tag(),
        items = config.items().len(),
        "Validated game config"
    );
    Ok(config)
}

/// Builds a config from an already-parsed JSON object.
#[instrument(skip(object))]
pub fn validate_object(object: &Map<String, Value>) -> GameConfig {
    let kind = match string_field(object, "type") {
        Some(tag) => GameKind::from_tag(&tag),
        None => {
            warn!("Response has no game type");
            GameKind::Unrecognized(String::new())
        }
    };
    if let GameKind::Unrecognized(tag) = &kind {
        warn!(tag = %tag, "Unrecognized game type, will play as quiz show");
    }

    let raw_items: &[Value] = match object.get("items") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            warn!(found = %type_name(other), "Items is not an array, ignoring");
            &[]
        }
        None => &[],
    };

    let items = if kind.has_pair_items() {
        GameItems::Pairs(collect_items(raw_items, pair_from_value))
    } else if kind == GameKind::BubblePop {
        GameItems::Bubbles(collect_items(raw_items, bubble_from_value))
    } else {
        GameItems::Questions(collect_items(raw_items, question_from_value))
    };

    GameConfig::new(
        kind,
        string_field(object, "title").unwrap_or_default(),
        string_field(object, "description").unwrap_or_default(),
        string_field(object, "reason").unwrap_or_default(),
        items,
    )
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Builds one item from its JSON object, claiming its id from `ids`.
type ItemBuilder<T> = fn(usize, &Map<String, Value>, &mut HashSet<String>) -> Option<T>;

fn collect_items<T>(values: &[Value], build: ItemBuilder<T>) -> Vec<T> {
    let mut ids = HashSet::new();
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match value {
            Value::Object(object) => build(index, object, &mut ids),
            other => {
                warn!(index, found = %type_name(other), "Item is not an object, dropping");
                None
            }
        })
        .collect()
}

fn question_from_value(
    index: usize,
    object: &Map<String, Value>,
    ids: &mut HashSet<String>,
) -> Option<Question> {
    let Some(text) = non_empty(string_field(object, "text")) else {
        warn!(index, "Question without text, dropping");
        return None;
    };
    let options: Vec<String> = match object.get("options") {
        Some(Value::Array(values)) => values.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    };
    let answer = string_field(object, "answer").unwrap_or_default();

    if !options.is_empty() && options.len() != OPTIONS_PER_QUESTION {
        warn!(index, count = options.len(), "Question has an unexpected number of options");
    }
    if !options.is_empty() && !options.iter().any(|o| *o == answer) {
        warn!(index, answer = %answer, "Answer does not match any option");
    }

    Some(Question::new(
        item_id(object, "q", index, ids),
        text,
        options,
        answer,
        non_empty(string_field(object, "explanation")),
    ))
}

fn pair_from_value(
    index: usize,
    object: &Map<String, Value>,
    ids: &mut HashSet<String>,
) -> Option<Pair> {
    let left = non_empty(string_field(object, "left"));
    let right = non_empty(string_field(object, "right"));
    match (left, right) {
        (Some(left), Some(right)) => Some(Pair::new(item_id(object, "p", index, ids), left, right)),
        _ => {
            warn!(index, "Pair missing a side, dropping");
            None
        }
    }
}

fn bubble_from_value(
    index: usize,
    object: &Map<String, Value>,
    ids: &mut HashSet<String>,
) -> Option<BubbleItem> {
    let Some(text) = non_empty(string_field(object, "text")) else {
        warn!(index, "Bubble without text, dropping");
        return None;
    };
    let is_correct = object
        .get("isCorrect")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(BubbleItem::new(
        item_id(object, "b", index, ids),
        text,
        is_correct,
    ))
}

/// Ids are unique within one config. A missing or repeated id is replaced by
/// the first free `{prefix}{n}` with `n` counting up from `index + 1`.
fn item_id(
    object: &Map<String, Value>,
    prefix: &str,
    index: usize,
    ids: &mut HashSet<String>,
) -> String {
    match object.get("id").and_then(scalar_to_string) {
        Some(id) if !id.trim().is_empty() && !ids.contains(&id) => {
            ids.insert(id.clone());
            return id;
        }
        Some(id) if !id.trim().is_empty() => {
            warn!(index, id = %id, "Duplicate item id, synthesizing a new one");
        }
        _ => debug!(index, "Synthesizing item id"),
    }
    let id = (index + 1..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|candidate| !ids.contains(candidate))
        .unwrap_or_else(|| format!("{}{}", prefix, index + 1));
    ids.insert(id.clone());
    id
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
