//! Common types used throughout timeorder
//!
//! This module contains shared type definitions, type aliases,
//! and the typed field model used by cursors, predicates and sources.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type, the row type of the bundled record sources
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values (query parameters)
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Field Types
// ============================================================================

/// Comparable type of a configured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Point in time, compared in UTC
    #[default]
    Timestamp,
    /// Signed 64-bit integer
    Integer,
    /// Plain string, compared bytewise
    Text,
}

impl FieldType {
    /// Parse untrusted textual input (a query parameter) into a value of this type
    pub fn parse(self, field: &str, raw: &str) -> Result<FieldValue> {
        let parsed = match self {
            FieldType::Timestamp => parse_timestamp(raw).map(FieldValue::Timestamp),
            FieldType::Integer => raw.trim().parse::<i64>().ok().map(FieldValue::Integer),
            FieldType::Text => Some(FieldValue::Text(raw.to_string())),
        };
        parsed.ok_or_else(|| Error::invalid_cursor(field, raw))
    }

    /// Read a stored JSON value as this type
    pub fn from_json(self, value: &JsonValue) -> Option<FieldValue> {
        match (self, value) {
            (FieldType::Timestamp, JsonValue::String(s)) => {
                parse_timestamp(s).map(FieldValue::Timestamp)
            }
            (FieldType::Integer, JsonValue::Number(n)) => n.as_i64().map(FieldValue::Integer),
            (FieldType::Integer, JsonValue::String(s)) => {
                s.trim().parse().ok().map(FieldValue::Integer)
            }
            (FieldType::Text, JsonValue::String(s)) => Some(FieldValue::Text(s.clone())),
            (FieldType::Text, JsonValue::Number(n)) => Some(FieldValue::Text(n.to_string())),
            (FieldType::Text, JsonValue::Bool(b)) => Some(FieldValue::Text(b.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Text => write!(f, "text"),
        }
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// A typed, comparable field value
///
/// Values of different variants are unordered with respect to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Instant in UTC
    Timestamp(DateTime<Utc>),
    /// Integer
    Integer(i64),
    /// String
    Text(String),
}

impl FieldValue {
    /// The type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Timestamp(_) => FieldType::Timestamp,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Text(_) => FieldType::Text,
        }
    }

    /// Encode for use in a query parameter
    ///
    /// Timestamps use ISO-8601 with an explicit `+00:00` offset and
    /// microsecond precision, widened to nanoseconds when the instant has
    /// sub-microsecond digits. They always parse back to the identical instant.
    pub fn to_query_value(&self) -> String {
        match self {
            FieldValue::Timestamp(ts) => {
                let precision = if ts.timestamp_subsec_nanos() % 1_000 == 0 {
                    SecondsFormat::Micros
                } else {
                    SecondsFormat::Nanos
                };
                ts.to_rfc3339_opts(precision, false)
            }
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Integer(i) => JsonValue::Number((*i).into()),
            other => JsonValue::String(other.to_query_value()),
        }
    }

    /// Compare two values of the same type
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Parse a timestamp in any of the ISO-8601 shapes clients send
///
/// Offsets are normalized to UTC; naive timestamps are taken as UTC and a
/// bare date means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    // An unencoded `+` in a query string arrives as a space
    if let Some((head, offset)) = raw.rsplit_once(' ') {
        if offset.len() == 5 && offset.as_bytes()[2] == b':' {
            return parse_timestamp(&format!("{head}+{offset}"));
        }
    }

    None
}

// ============================================================================
// Field Definitions and Ordering
// ============================================================================

/// A named field together with its comparable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field (column) name
    pub name: String,
    /// Comparable type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl FieldDef {
    /// Create a field definition
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Shorthand for a timestamp field
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    /// Shorthand for an integer field
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }
}

/// Ordering direction for sorted fetches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    /// Ascending order (smallest first)
    #[default]
    Asc,
    /// Descending order (largest first)
    Desc,
}

/// One term of a sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to sort on
    pub field: FieldDef,
    /// Direction
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Ascending order on a field
    pub fn asc(field: FieldDef) -> Self {
        Self {
            field,
            direction: OrderDirection::Asc,
        }
    }

    /// Descending order on a field
    pub fn desc(field: FieldDef) -> Self {
        Self {
            field,
            direction: OrderDirection::Desc,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Read access to the named fields of a stored record
pub trait Record {
    /// Raw JSON value of a field, if present
    fn field(&self, name: &str) -> Option<&JsonValue>;

    /// Typed value of a field, if present and of the expected type
    fn field_value(&self, def: &FieldDef) -> Option<FieldValue> {
        self.field(&def.name)
            .and_then(|value| def.field_type.from_json(value))
    }
}

impl Record for JsonObject {
    fn field(&self, name: &str) -> Option<&JsonValue> {
        self.get(name)
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for Option<&String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty()).cloned()
    }
}
