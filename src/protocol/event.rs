//! Change notification types.
//!
//! The server pushes one text frame per row change, for every collection,
//! over the shared WebSocket. Nothing is ever sent in the other direction.
//!
//! # Format
//!
//! ```json
//! {
//!   "collection": "users",
//!   "event": "INSERT",
//!   "data": { "id": 1, "name": "John Doe" }
//! }
//! ```
//!
//! Any other top-level fields are preserved in [`ChangeEvent::extra`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Returned by [`ChangeEvent::record`] when a frame has no `data` field.
static NO_RECORD: Value = Value::Null;

// ============================================================================
// ChangeEvent
// ============================================================================

/// A change notification decoded from one inbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Collection the change happened in.
    pub collection: String,

    /// Event name (the server emits `INSERT`, `UPDATE` and `DELETE`).
    pub event: String,

    /// Changed record as sent. `None` when the frame has no `data` field,
    /// `Some(Value::Null)` when it carries `"data": null`.
    #[serde(
        default,
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,

    /// Every other top-level field, verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeEvent {
    /// Creates an event with no extra fields.
    #[inline]
    #[must_use]
    pub fn new(collection: impl Into<String>, event: impl Into<String>, data: Value) -> Self {
        Self {
            collection: collection.into(),
            event: event.into(),
            data: Some(data),
            extra: Map::new(),
        }
    }

    /// Decodes an inbound text frame.
    ///
    /// # Errors
    ///
    /// [`Error::Json`](crate::Error::Json) if the frame is not JSON or lacks
    /// a string `collection` or `event`.
    pub fn from_frame(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the changed record, or `Null` if the frame had none.
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Value {
        self.data.as_ref().unwrap_or(&NO_RECORD)
    }

    /// Returns a top-level field by name, including `collection`, `event`
    /// and `data`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "collection" => Some(Value::String(self.collection.clone())),
            "event" => Some(Value::String(self.event.clone())),
            "data" => self.data.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Returns the full payload as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("collection".into(), Value::String(self.collection.clone()));
        map.insert("event".into(), Value::String(self.event.clone()));
        if let Some(data) = &self.data {
            map.insert("data".into(), data.clone());
        }
        Value::Object(map)
    }

    /// Deserializes [`record`](Self::record) into a typed record.
    ///
    /// # Errors
    ///
    /// [`Error::Json`](crate::Error::Json) if the shape does not match `T`.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(T::deserialize(self.record())?)
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; absence falls back to
/// `#[serde(default)]`.
fn present_field<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// EventSelector
// ============================================================================

/// Which events of a collection a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventSelector {
    /// Every event (`"*"`).
    Any,
    /// Only events with exactly this name.
    Named(String),
}

impl EventSelector {
    /// The wildcard selector string.
    pub const WILDCARD: &'static str = "*";

    /// Returns `true` if an event named `event` is selected.
    #[inline]
    #[must_use]
    pub fn matches(&self, event: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Named(name) => name == event,
        }
    }

    /// Returns the selector as it is written by callers.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => Self::WILDCARD,
            Self::Named(name) => name,
        }
    }
}

impl From<&str> for EventSelector {
    fn from(value: &str) -> Self {
        if value == Self::WILDCARD {
            Self::Any
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl From<String> for EventSelector {
    fn from(value: String) -> Self {
        if value == Self::WILDCARD {
            Self::Any
        } else {
            Self::Named(value)
        }
    }
}

impl fmt::Display for EventSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
