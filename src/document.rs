use crate::event::{kind_of, Event, MalformedCall};
use json::JsonValue;
use thiserror::Error;

/// Why an input couldn't be read as a json document at all.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Syntax(#[from] json::Error),
    #[error("top level value is {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Why a parsed document has no usable `events` array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("events is nil")]
    Missing,
    #[error("events is {0}, not an array")]
    NotAnArray(&'static str),
}

/// Parse the raw bytes of an AppMap. A top level `null` is let through so it gets reported as a missing `events`.
/// Invalid UTF-8, which recorded parameter values can carry, is replaced rather than rejected.
pub fn decode(bytes: &[u8]) -> Result<JsonValue, DecodeError> {
    let root = json::parse(&String::from_utf8_lossy(bytes))?;
    if root.is_object() || root.is_null() {
        Ok(root)
    } else {
        Err(DecodeError::NotAnObject(kind_of(&root)))
    }
}

/// The part of a decoded AppMap the statistics care about: its events, in recorded order.
#[derive(Debug)]
pub struct Document {
    events: Vec<JsonValue>,
}

impl Document {
    /// Take the `events` array out of a decoded AppMap, dropping everything else.
    pub fn from_root(mut root: JsonValue) -> Result<Self, ShapeError> {
        match root.remove("events") {
            JsonValue::Array(events) => Ok(Self { events }),
            JsonValue::Null => Err(ShapeError::Missing),
            other => Err(ShapeError::NotAnArray(kind_of(&other))),
        }
    }

    /// Number of events of every kind.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = Result<Event, MalformedCall>> + '_ {
        self.events.iter().map(Event::from_json)
    }
}
