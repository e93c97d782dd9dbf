//! Domain DTOs for the todo API.
//!
//! # Design
//! `Todo` is both the wire shape and the in-memory record the controller
//! keeps. Ids are assigned on the client from the creation instant
//! (milliseconds since the Unix epoch, as a decimal string), so a record's
//! creation time can be recovered from its id.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item as exchanged with the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// A fresh, not yet completed record whose id is derived from `now`.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: time_id(now),
            title: title.into(),
            completed: false,
        }
    }

    /// Copy of this record with `completed` inverted.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this record carrying `title`.
    pub fn renamed(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// Creation instant encoded in the id, if the id is a millisecond
    /// timestamp. Records created by other clients may carry arbitrary ids.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.id.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

/// Render `now` as a todo id.
pub fn time_id(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn new_todo_uses_millisecond_id() {
        let todo = Todo::new("Buy milk", instant());
        assert_eq!(todo.id, "1700000000123");
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
    }

    #[test]
    fn created_at_recovers_instant() {
        let todo = Todo::new("x", instant());
        assert_eq!(todo.created_at(), Some(instant()));
    }

    #[test]
    fn created_at_is_none_for_foreign_ids() {
        let todo = Todo {
            id: "abc".to_string(),
            title: "x".to_string(),
            completed: false,
        };
        assert!(todo.created_at().is_none());
    }

    #[test]
    fn toggled_only_flips_completed() {
        let todo = Todo::new("Walk dog", instant());
        let flipped = todo.toggled();
        assert_eq!(flipped.id, todo.id);
        assert_eq!(flipped.title, todo.title);
        assert!(flipped.completed);
        assert!(!flipped.toggled().completed);
    }

    #[test]
    fn completed_defaults_to_false_on_the_wire() {
        let todo: Todo = serde_json::from_str(r#"{"id":"1","title":"t"}"#).unwrap();
        assert!(!todo.completed);
    }

    #[test]
    fn only_id_is_required_on_the_wire() {
        let todo: Todo = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(todo.title, "");
        assert!(serde_json::from_str::<Todo>(r#"{"title":"t"}"#).is_err());
    }
}
