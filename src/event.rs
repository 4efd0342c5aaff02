use json::JsonValue;
use thiserror::Error;

/// A single recorded method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    pub defined_class: String,
    pub method_id: String,
    pub is_static: bool,
}

impl CallEvent {
    /// The signature this call is counted under.
    pub fn signature(&self) -> String {
        signature(&self.defined_class, &self.method_id, self.is_static)
    }
}

/// Build a call signature: `Class.method` for static methods, `Class#method` for instance methods.
pub fn signature(defined_class: &str, method_id: &str, is_static: bool) -> String {
    let separator = if is_static { '.' } else { '#' };
    format!("{}{}{}", defined_class, separator, method_id)
}

/// One element of an AppMap's `events` array, as far as call statistics are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Call(CallEvent),
    /// Returns, SQL queries, HTTP requests and anything else that isn't a call.
    Other,
}

impl Event {
    /// Decode an event, checking the call fields before building a `CallEvent`.
    /// Anything whose `event` field isn't the string `"call"` is `Event::Other`, including non-objects.
    pub fn from_json(event: &JsonValue) -> Result<Self, MalformedCall> {
        if event["event"] != "call" {
            return Ok(Event::Other);
        }
        Ok(Event::Call(CallEvent {
            defined_class: string_field(event, "defined_class")?,
            method_id: string_field(event, "method_id")?,
            is_static: bool_field(event, "static")?,
        }))
    }
}

/// Why a call event couldn't be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedCall {
    #[error("`{0}` is missing")]
    Missing(&'static str),
    #[error("`{field}` is {found}, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl MalformedCall {
    fn new(field: &'static str, expected: &'static str, value: &JsonValue) -> Self {
        if value.is_null() {
            MalformedCall::Missing(field)
        } else {
            MalformedCall::WrongType { field, expected, found: kind_of(value) }
        }
    }
}

fn string_field(event: &JsonValue, field: &'static str) -> Result<String, MalformedCall> {
    let value = &event[field];
    value.as_str().map(str::to_owned).ok_or_else(|| MalformedCall::new(field, "a string", value))
}

fn bool_field(event: &JsonValue, field: &'static str) -> Result<bool, MalformedCall> {
    let value = &event[field];
    value.as_bool().ok_or_else(|| MalformedCall::new(field, "a boolean", value))
}

/// Human readable name of a json value's type, for diagnostics.
pub(crate) fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Short(_) | JsonValue::String(_) => "a string",
        JsonValue::Number(_) => "a number",
        JsonValue::Boolean(_) => "a boolean",
        JsonValue::Object(_) => "an object",
        JsonValue::Array(_) => "an array",
    }
}
