//! Conversation history translation
//!
//! The frontend sends prior turns as `{role, content}` pairs using the
//! `user`/`assistant` vocabulary. The provider expects `{role, parts}` with
//! `user`/`model`. Translation is lenient: entries that are incomplete or
//! carry an unknown role are dropped, not rejected.

use crate::json::{self, is_falsy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structural problems with the `history` field
///
/// Individual bad entries are skipped; only a history that cannot be walked
/// at all is an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history must be a list, got {0}")]
    NotAList(&'static str),

    #[error("history entry {index} must be an object, got {kind}")]
    EntryNotAnObject { index: usize, kind: &'static str },

    #[error("history entry {index} has {kind} content; only text can be relayed")]
    NonTextContent { index: usize, kind: &'static str },
}

/// One caller-supplied history entry
///
/// Fields are optional because the caller may omit either one; such entries
/// are dropped during translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl HistoryEntry {
    /// Build an entry with both fields present
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }

    /// Read an entry from arbitrary JSON
    ///
    /// A non-string `role` can never name a known role, so it is treated as
    /// missing, as is falsy `content`. Truthy non-string `content` under a
    /// known role would have to be sent upstream and is an error.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, HistoryError> {
        let object = value.as_object().ok_or(HistoryError::EntryNotAnObject {
            index,
            kind: json::kind(value),
        })?;

        let field = |name: &str| object.get(name).and_then(Value::as_str).map(str::to_owned);
        let role = field("role");

        let known_role = role.as_deref().and_then(Role::from_caller).is_some();
        let non_text = object
            .get("content")
            .filter(|content| known_role && !content.is_string() && !is_falsy(content));
        if let Some(content) = non_text {
            return Err(HistoryError::NonTextContent {
                index,
                kind: json::kind(content),
            });
        }

        Ok(Self {
            role,
            content: field("content"),
        })
    }
}

/// Provider-side author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Map the frontend's role vocabulary; anything unrecognized yields `None`
    pub fn from_caller(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Model),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// Provider-format history entry: `{role, parts: [content]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<String>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![content.into()],
        }
    }
}

/// Read the `history` field of a request body
///
/// An absent or `null` history is empty.
pub fn parse_history(value: Option<&Value>) -> Result<Vec<HistoryEntry>, HistoryError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| HistoryEntry::from_value(index, item))
            .collect(),
        Some(other) => Err(HistoryError::NotAList(json::kind(other))),
    }
}

/// Translate caller history into provider turns, preserving order
pub fn format_history(entries: &[HistoryEntry]) -> Vec<Turn> {
    entries
        .iter()
        .filter_map(|entry| {
            let role = entry.role.as_deref().filter(|r| !r.is_empty())?;
            let content = entry.content.as_deref().filter(|c| !c.is_empty())?;
            let role = Role::from_caller(role)?;
            Some(Turn::new(role, content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_assistant_maps_to_model() {
        let turns = format_history(&[HistoryEntry::new("assistant", "hi")]);
        assert_eq!(turns, vec![Turn::new(Role::Model, "hi")]);
    }

    #[test]
    fn test_user_maps_to_user() {
        let turns = format_history(&[HistoryEntry::new("user", "hey")]);
        assert_eq!(turns, vec![Turn::new(Role::User, "hey")]);
    }

    #[test]
    fn test_unknown_role_is_dropped() {
        assert!(format_history(&[HistoryEntry::new("system", "x")]).is_empty());
    }

    #[test]
    fn test_missing_content_is_dropped() {
        let entry = HistoryEntry {
            role: Some("user".to_string()),
            content: None,
        };
        assert!(format_history(&[entry]).is_empty());
    }

    #[test]
    fn test_empty_fields_are_dropped() {
        let entries = [HistoryEntry::new("", "text"), HistoryEntry::new("user", "")];
        assert!(format_history(&entries).is_empty());
    }

    #[test]
    fn test_whitespace_content_is_kept() {
        let turns = format_history(&[HistoryEntry::new("user", "   ")]);
        assert_eq!(turns, vec![Turn::new(Role::User, "   ")]);
    }

    #[test]
    fn test_order_preserved_without_gaps() {
        let entries = [
            HistoryEntry::new("user", "A"),
            HistoryEntry::new("unknown", "B"),
            HistoryEntry::new("assistant", "C"),
        ];
        let turns = format_history(&entries);
        assert_eq!(
            turns,
            vec![Turn::new(Role::User, "A"), Turn::new(Role::Model, "C")]
        );
    }

    #[test]
    fn test_turn_serializes_to_provider_shape() {
        let turn = Turn::new(Role::Model, "hi");
        assert_eq!(
            serde_json::to_value(&turn).expect("should serialize"),
            json!({"role": "model", "parts": ["hi"]})
        );
    }

    #[test]
    fn test_parse_history_absent_or_null_is_empty() {
        assert_eq!(parse_history(None), Ok(Vec::new()));
        assert_eq!(parse_history(Some(&Value::Null)), Ok(Vec::new()));
    }

    #[test]
    fn test_parse_history_non_string_role_and_falsy_content_are_missing() {
        let value = json!([
            {"role": 1, "content": "x"},
            {"role": "user", "content": false},
            {"role": "assistant", "content": 0},
            {"role": "system", "content": 123}
        ]);
        let entries = parse_history(Some(&value)).expect("should parse");
        assert_eq!(entries[0].role, None);
        assert_eq!(entries[1].content, None);
        assert_eq!(entries[2].content, None);
        assert_eq!(entries[3].content, None);
        assert!(format_history(&entries).is_empty());
    }

    #[test]
    fn test_parse_history_rejects_non_text_content() {
        let value = json!([
            {"role": "assistant", "content": "ok"},
            {"role": "user", "content": 123}
        ]);
        assert_eq!(
            parse_history(Some(&value)),
            Err(HistoryError::NonTextContent {
                index: 1,
                kind: "number"
            })
        );

        let value = json!([{"role": "assistant", "content": {"text": "hi"}}]);
        assert_eq!(
            parse_history(Some(&value)),
            Err(HistoryError::NonTextContent {
                index: 0,
                kind: "object"
            })
        );
    }

    #[test]
    fn test_parse_history_rejects_non_list() {
        let value = json!("not a list");
        assert_eq!(
            parse_history(Some(&value)),
            Err(HistoryError::NotAList("string"))
        );
    }

    #[test]
    fn test_parse_history_rejects_non_object_entry() {
        let value = json!([{"role": "user", "content": "ok"}, 42]);
        assert_eq!(
            parse_history(Some(&value)),
            Err(HistoryError::EntryNotAnObject {
                index: 1,
                kind: "number"
            })
        );
    }

    fn arb_entry() -> impl Strategy<Value = HistoryEntry> {
        let role = prop_oneof![
            Just(None),
            Just(Some(String::new())),
            Just(Some("user".to_string())),
            Just(Some("assistant".to_string())),
            "[a-z]{1,8}".prop_map(Some),
        ];
        let content = prop_oneof![Just(None), ".{0,12}".prop_map(Some)];
        (role, content).prop_map(|(role, content)| HistoryEntry { role, content })
    }

    proptest! {
        #[test]
        fn prop_output_is_ordered_subsequence(entries in prop::collection::vec(arb_entry(), 0..20)) {
            let turns = format_history(&entries);
            prop_assert!(turns.len() <= entries.len());

            // Every turn matches a later input entry than the previous one
            let mut cursor = 0;
            for turn in &turns {
                let found = entries[cursor..].iter().position(|e| {
                    e.content.as_deref() == turn.parts.first().map(String::as_str)
                        && e.role.as_deref().and_then(Role::from_caller) == Some(turn.role)
                });
                prop_assert!(found.is_some());
                cursor += found.unwrap_or(0) + 1;
            }
        }

        #[test]
        fn prop_turns_have_one_non_empty_part(entries in prop::collection::vec(arb_entry(), 0..20)) {
            for turn in format_history(&entries) {
                prop_assert_eq!(turn.parts.len(), 1);
                prop_assert!(!turn.parts[0].is_empty());
            }
        }
    }
}
