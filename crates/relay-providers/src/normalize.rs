//! Field-name helpers shared by provider adapters.
//!
//! Providers spell the same concept many ways (`status`, `state`,
//! `description`...). Adapters list the candidate keys they accept; these
//! helpers pick the first present value and fall back to an empty string so
//! normalized results never contain nulls.

use relay_core::TrackingEvent;
use serde_json::Value;

/// Candidate keys for the event list when a provider's own key is absent.
pub const EVENT_LIST_KEYS: &[&str] =
    &["events", "tracking_events", "history", "tracking", "statuses"];

/// Candidate keys for each `TrackingEvent` field.
#[derive(Debug, Clone, Copy)]
pub struct EventFields {
    /// Keys for `id`.
    pub id: &'static [&'static str],
    /// Keys for `status`.
    pub status: &'static [&'static str],
    /// Keys for `description`.
    pub description: &'static [&'static str],
    /// Keys for `timestamp`.
    pub timestamp: &'static [&'static str],
    /// Keys for `location`.
    pub location: &'static [&'static str],
}

impl EventFields {
    /// Field names seen across the providers' generic event shapes.
    pub const GENERIC: Self = Self {
        id: &["id", "eventId", "event_id"],
        status: &["status", "state", "description", "message"],
        description: &["description", "message", "details", "note", "status"],
        timestamp: &["timestamp", "occurred_at", "date", "time", "created_at", "datetime"],
        location: &["location", "place", "city"],
    };
}

/// Returns the first non-empty scalar among `keys`, rendered as a string.
pub fn text(value: &Value, keys: &[&str]) -> String {
    keys.iter().find_map(|key| value.get(*key).and_then(scalar)).unwrap_or_default()
}

/// Returns the non-empty scalar at a JSON pointer, or an empty string.
pub fn text_at(value: &Value, pointer: &str) -> String {
    value.pointer(pointer).and_then(scalar).unwrap_or_default()
}

/// Returns the first array among `keys`, or an empty slice.
pub fn array<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Returns the first boolean among `keys`, or `default`.
pub fn flag(value: &Value, keys: &[&str], default: bool) -> bool {
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_bool)).unwrap_or(default)
}

/// Renders a location that may be a plain string or an address object.
pub fn location(value: &Value, keys: &[&str]) -> String {
    for key in keys {
        match value.get(*key) {
            Some(Value::Object(_)) => {
                let rendered = address(&value[*key]);
                if !rendered.is_empty() {
                    return rendered;
                }
            },
            Some(other) => {
                if let Some(text) = scalar(other) {
                    return text;
                }
            },
            None => {},
        }
    }
    String::new()
}

/// Joins the populated parts of an address object.
pub fn address(value: &Value) -> String {
    let inner = value.get("address").unwrap_or(value);
    ["city", "stateProvince", "state", "country", "countryCode"]
        .iter()
        .filter_map(|key| inner.get(*key).and_then(scalar))
        .fold(Vec::<String>::new(), |mut parts, part| {
            if !parts.contains(&part) {
                parts.push(part);
            }
            parts
        })
        .join(", ")
}

/// Builds one event from a provider object using the given candidate keys.
pub fn event(value: &Value, fields: &EventFields) -> TrackingEvent {
    TrackingEvent {
        id: text(value, fields.id),
        status: text(value, fields.status),
        description: text(value, fields.description),
        timestamp: text(value, fields.timestamp),
        location: location(value, fields.location),
    }
}

/// Lowercase, dash-separated slug.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        },
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
