//! Compact storage encoding for upset thread items.
//!
//! Version 1 is a bare 12 element JSON array, positional:
//!
//! ```text
//! [winnersName, winnersCharacters, winnersSeed, score, losersName,
//!  losersCharacters, isWinnersBracket, losersSeed, losersPlacement,
//!  upsetFactor, completedAt, category]
//! ```
//!
//! The set id is not part of the payload; it is the hash field the payload is
//! stored under. Later versions must be distinguishable from a bare array so
//! existing stores keep decoding.

use serde_json::Value;

use crate::classify::Category;
use crate::error::CodecError;
use crate::thread::UpsetThreadItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecVersion {
    V1,
}

pub const CURRENT_VERSION: CodecVersion = CodecVersion::V1;

type WireV1 = (
    String,
    String,
    i32,
    Option<String>,
    String,
    String,
    bool,
    i32,
    i32,
    i32,
    i64,
    String,
);

pub fn encode_item(item: &UpsetThreadItem) -> String {
    encode_item_as(item, CURRENT_VERSION)
}

pub fn encode_item_as(item: &UpsetThreadItem, version: CodecVersion) -> String {
    match version {
        CodecVersion::V1 => {
            let wire: WireV1 = (
                item.winners_name.clone(),
                item.winners_characters.clone(),
                item.winners_seed,
                item.score.clone(),
                item.losers_name.clone(),
                item.losers_characters.clone(),
                item.is_winners_bracket,
                item.losers_seed,
                item.losers_placement,
                item.upset_factor,
                item.completed_at,
                item.category.tag().to_string(),
            );
            // a tuple of strings, numbers and bools always serializes
            serde_json::to_string(&wire).unwrap_or_default()
        }
    }
}

pub fn detect_version(value: &Value) -> Option<CodecVersion> {
    match value {
        Value::Array(_) => Some(CodecVersion::V1),
        _ => None,
    }
}

pub fn decode_item(id: &str, raw: &str) -> Result<UpsetThreadItem, CodecError> {
    let json_err = |source| CodecError::Json {
        id: id.to_string(),
        source,
    };
    let value: Value = serde_json::from_str(raw).map_err(json_err)?;
    match detect_version(&value) {
        Some(CodecVersion::V1) => {
            let wire: WireV1 = serde_json::from_value(value).map_err(json_err)?;
            Ok(from_wire_v1(id, wire))
        }
        None => Err(CodecError::UnsupportedFormat { id: id.to_string() }),
    }
}

fn from_wire_v1(id: &str, wire: WireV1) -> UpsetThreadItem {
    let (
        winners_name,
        winners_characters,
        winners_seed,
        score,
        losers_name,
        losers_characters,
        is_winners_bracket,
        losers_seed,
        losers_placement,
        upset_factor,
        completed_at,
        category,
    ) = wire;
    UpsetThreadItem {
        id: id.to_string(),
        winners_name,
        winners_characters,
        winners_seed,
        score,
        losers_name,
        losers_characters,
        is_winners_bracket,
        losers_seed,
        losers_placement,
        upset_factor,
        completed_at,
        category: Category::from_tag(&category),
    }
}
