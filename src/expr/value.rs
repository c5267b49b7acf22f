//! Dynamic values and the documents conditions are evaluated against.
//!
//! Card content is declarative data, so expressions operate on a small
//! closed set of value shapes:
//!
//! - `Null`: absent data (a missing path evaluates to `Null`)
//! - `Bool`, `Int`, `Text`: scalars
//! - `List`, `Map`: nested structure
//!
//! Maps use `BTreeMap` so documents serialize and compare deterministically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, Team};

/// A dynamic value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Absent data.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer (scores, stats, entity ids).
    Int(i64),
    /// Text (slugs, team tags, selections).
    Text(String),
    /// Ordered list.
    List(Vec<Value>),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// True for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as integer if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice if this is `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list slice if this is a `List`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map if this is a `Map`.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Interpret as a team tag.
    #[must_use]
    pub fn as_team(&self) -> Option<Team> {
        self.as_text().and_then(Team::parse)
    }

    /// Interpret as an entity id.
    #[must_use]
    pub fn as_entity(&self) -> Option<EntityId> {
        self.as_int()
            .and_then(|raw| u32::try_from(raw).ok())
            .map(EntityId)
    }

    /// Look up a key if this is a `Map`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Name of the shape, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Team> for Value {
    fn from(team: Team) -> Self {
        Value::Text(team.as_str().to_string())
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Int(i64::from(id.0))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// The root map a condition or effect parameter is evaluated against.
///
/// Paths are dotted (`"event.team"`, `"self.stats.shooting"`); each segment
/// descends one map level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    root: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(key.into(), value.into());
    }

    /// Insert a top-level key (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge fields at the top level, overwriting existing keys.
    pub fn merge<'a>(&mut self, fields: impl IntoIterator<Item = (&'a String, &'a Value)>) {
        for (k, v) in fields {
            self.root.insert(k.clone(), v.clone());
        }
    }

    /// Resolve a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = match current {
                Value::Map(m) => m.get(segment)?,
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Check whether a top-level key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::from("home").as_team(), Some(Team::Home));
        assert_eq!(Value::Int(12).as_entity(), Some(EntityId(12)));
        assert_eq!(Value::Int(-1).as_entity(), None);
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::Bool(true).type_name(), "bool");
    }

    #[test]
    fn test_document_paths() {
        let doc = Document::new()
            .with("team", Team::Away)
            .with(
                "self",
                Value::map([
                    ("id", Value::Int(4)),
                    ("stats", Value::map([("shooting", Value::Int(5))])),
                ]),
            )
            .with("tags", Value::List(vec![Value::from("fast")]));

        assert_eq!(doc.get("team"), Some(&Value::from("away")));
        assert_eq!(doc.get("self.stats.shooting"), Some(&Value::Int(5)));
        assert_eq!(doc.get("tags.0"), Some(&Value::from("fast")));
        assert_eq!(doc.get("self.missing"), None);
        assert_eq!(doc.get("team.deeper"), None);
        assert_eq!(doc.get(""), None);
    }

    #[test]
    fn test_document_merge_overwrites() {
        let mut doc = Document::new().with("zone", "paint");
        let mut fields = BTreeMap::new();
        fields.insert("zone".to_string(), Value::from("arc"));
        doc.merge(&fields);
        assert_eq!(doc.get("zone"), Some(&Value::from("arc")));
    }

    #[test]
    fn test_value_serialization() {
        let value = Value::map([("a", Value::List(vec![Value::Int(1), Value::Null]))]);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
