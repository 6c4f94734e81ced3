//! Typed filter predicates
//!
//! A small expression tree over named fields. Sources either evaluate it
//! directly ([`Predicate::matches`]) or translate it into their own query
//! language.

use crate::types::{FieldValue, Record};
use std::cmp::Ordering;
use std::fmt;

/// Filter condition over record fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record
    MatchAll,
    /// `field > value`
    GreaterThan { field: String, value: FieldValue },
    /// `field >= value`
    GreaterOrEqual { field: String, value: FieldValue },
    /// `field == value`
    Equal { field: String, value: FieldValue },
    /// Both sides match
    And(Box<Predicate>, Box<Predicate>),
    /// Either side matches
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// `field > value`
    pub fn greater_than(field: impl Into<String>, value: FieldValue) -> Self {
        Self::GreaterThan {
            field: field.into(),
            value,
        }
    }

    /// `field >= value`
    pub fn greater_or_equal(field: impl Into<String>, value: FieldValue) -> Self {
        Self::GreaterOrEqual {
            field: field.into(),
            value,
        }
    }

    /// `field == value`
    pub fn equal(field: impl Into<String>, value: FieldValue) -> Self {
        Self::Equal {
            field: field.into(),
            value,
        }
    }

    /// Conjunction
    pub fn and(self, other: Predicate) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Disjunction
    pub fn or(self, other: Predicate) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// True when no filtering is applied
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    /// Evaluate against a record
    ///
    /// A missing field, or one that can't be read as the comparison value's
    /// type, never matches.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::MatchAll => true,
            Self::GreaterThan { field, value } => {
                compare_field(record, field, value) == Some(Ordering::Greater)
            }
            Self::GreaterOrEqual { field, value } => matches!(
                compare_field(record, field, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Equal { field, value } => {
                compare_field(record, field, value) == Some(Ordering::Equal)
            }
            Self::And(a, b) => a.matches(record) && b.matches(record),
            Self::Or(a, b) => a.matches(record) || b.matches(record),
        }
    }
}

fn compare_field<R: Record + ?Sized>(
    record: &R,
    field: &str,
    value: &FieldValue,
) -> Option<Ordering> {
    let stored = record
        .field(field)
        .and_then(|raw| value.field_type().from_json(raw))?;
    stored.compare(value)
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchAll => write!(f, "TRUE"),
            Self::GreaterThan { field, value } => write!(f, "{field} > {value}"),
            Self::GreaterOrEqual { field, value } => write!(f, "{field} >= {value}"),
            Self::Equal { field, value } => write!(f, "{field} = {value}"),
            Self::And(a, b) => write!(f, "({a} AND {b})"),
            Self::Or(a, b) => write!(f, "({a} OR {b})"),
        }
    }
}
