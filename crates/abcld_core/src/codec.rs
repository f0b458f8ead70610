//! Board document codec (JSON).
//!
//! # Responsibility
//! - Serialize a board to the portable download/storage format.
//! - Decode imported or persisted text back into a board.
//!
//! # Invariants
//! - `weeks` is mandatory and must be a sequence; a missing or non-sequence
//!   `weeks` is the only format error besides a non-object root.
//! - `cards` is lenient: missing, `null` or non-sequence decodes as empty.
//! - Entries are decoded one by one. Field content never fails an entry;
//!   an entry that is not an object is dropped and logged.
//! - Decoding does not check references between cards and weeks.

use crate::model::board::{Board, Card, Week, DEFAULT_BOARD_TITLE};
use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    /// Document text is JSON but lacks mandatory structure.
    Format(String),
    /// Document text is not valid JSON, or serialization failed.
    Json(serde_json::Error),
}

impl CodecError {
    /// Both variants mean "this is not a board file" to the user.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Json(_))
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(message) => write!(f, "invalid board format: {message}"),
            Self::Json(err) => write!(f, "invalid board json: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Format(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Encodes a board as pretty-printed JSON (two-space indent).
pub fn encode(board: &Board) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(board)?)
}

/// Decodes board text. Only the root shape and `weeks` are strict.
pub fn decode(text: &str) -> CodecResult<Board> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Object(mut fields) = document else {
        return Err(CodecError::Format(
            "document root must be an object".to_string(),
        ));
    };

    let weeks = match fields.remove("weeks") {
        Some(Value::Array(items)) => decode_entries::<Week>("week", items),
        Some(_) => {
            return Err(CodecError::Format("`weeks` must be a sequence".to_string()));
        }
        None => return Err(CodecError::Format("missing `weeks`".to_string())),
    };

    let cards = match fields.remove("cards") {
        Some(Value::Array(items)) => decode_entries::<Card>("card", items),
        _ => Vec::new(),
    };

    Ok(Board {
        title: decode_title(&fields),
        weeks,
        cards,
        last_modified_at: decode_timestamp(&fields),
    })
}

fn decode_entries<T: DeserializeOwned>(kind: &str, items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let dropped = total - decoded.len();
    if dropped > 0 {
        warn!("event=board_decode module=codec status=degraded kind={kind} dropped={dropped}");
    }
    decoded
}

fn decode_title(fields: &Map<String, Value>) -> String {
    fields
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(DEFAULT_BOARD_TITLE)
        .to_string()
}

fn decode_timestamp(fields: &Map<String, Value>) -> DateTime<Utc> {
    fields
        .get("lastModifiedAt")
        .or_else(|| fields.get("lastModified"))
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::{decode, CodecError};

    #[test]
    fn non_object_root_is_format_error() {
        let err = decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }

    #[test]
    fn weeks_of_wrong_type_is_format_error() {
        let err = decode(r#"{"weeks": {"id": "w1"}}"#).unwrap_err();
        assert!(err.to_string().contains("`weeks` must be a sequence"));
    }

    #[test]
    fn broken_json_is_reported_as_json_error() {
        let err = decode("{ not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn entries_that_are_not_objects_are_dropped() {
        let board = decode(
            r#"{"weeks": [{"id": "w1"}, 4, "week"], "cards": [null, {"id": "c1", "weekId": "w1"}]}"#,
        )
        .unwrap();
        assert_eq!(board.weeks.len(), 1);
        assert_eq!(board.weeks[0].id, "w1");
        assert_eq!(board.cards.len(), 1);
        assert_eq!(board.cards[0].id, "c1");
    }

    #[test]
    fn legacy_last_modified_key_is_accepted() {
        let board = decode(
            r#"{"title": "T", "weeks": [], "lastModified": "2025-01-02T03:04:05.000Z"}"#,
        )
        .unwrap();
        assert_eq!(board.last_modified_at.to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }
}
