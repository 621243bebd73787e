//! Inbound event records
//!
//! An event is a JSON object plus the timestamp the record claims for
//! itself. The filter only ever reads events: field lookups feed key
//! interpolation, and the timestamp feeds the age gate.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// One inbound record
#[derive(Debug, Clone)]
pub struct Event {
    fields: Value,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an event from a JSON object and its record timestamp
    pub fn new(fields: Value, timestamp: DateTime<Utc>) -> Self {
        Self { fields, timestamp }
    }

    /// The record's own timestamp
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The underlying JSON object
    #[inline]
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// Look up a field using dot notation
    ///
    /// Supports paths like "level" or "error.code". Returns None when any
    /// segment is missing or a non-object is traversed.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut current = &self.fields;
        for part in path.split('.') {
            match current {
                Value::Object(map) => current = map.get(part)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Render a scalar field as a string, for key interpolation
    ///
    /// Strings render unquoted; numbers and booleans via their display
    /// form. Null, arrays and objects do not interpolate.
    pub fn field_str(&self, path: &str) -> Option<String> {
        match self.field(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}
