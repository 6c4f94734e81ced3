//! Cursor filter construction
//!
//! Turns raw cursor parameters into a [`CursorSpec`], and a spec into the
//! predicate and sort order a record source executes.

use super::predicate::Predicate;
use super::types::{CursorParams, CursorSpec};
use crate::error::Result;
use crate::types::{FieldDef, FieldValue, OrderBy};

/// Builds keyset predicates over an ordered field and a tie-breaker
///
/// The tie-breaker must be unique and never change after a record is created.
/// The ordered field may change at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorFilter {
    ordered: FieldDef,
    tie_breaker: FieldDef,
}

impl CursorFilter {
    /// Create a filter for the given fields
    pub fn new(ordered: FieldDef, tie_breaker: FieldDef) -> Self {
        Self {
            ordered,
            tie_breaker,
        }
    }

    /// The ordered (mutable timestamp) field
    pub fn ordered_field(&self) -> &FieldDef {
        &self.ordered
    }

    /// The tie-breaker (immutable identifier) field
    pub fn tie_breaker_field(&self) -> &FieldDef {
        &self.tie_breaker
    }

    /// Resolve raw parameters into a cursor
    ///
    /// `after` takes precedence over `from`; when it is used, `from` and the
    /// tie-breaker start are ignored. A value that doesn't parse is treated as
    /// absent, so a request with nothing usable degrades to [`CursorSpec::None`].
    pub fn resolve(&self, params: &CursorParams) -> CursorSpec {
        if let Some(raw) = &params.after {
            match self.parse_ordered(raw) {
                Ok(value) => return CursorSpec::After(value),
                Err(e) => tracing::debug!("Discarding after cursor: {}", e),
            }
        }

        if let Some(raw) = &params.from {
            match self.parse_ordered(raw) {
                Ok(value) => {
                    let tie_breaker_start = params
                        .start_from
                        .as_deref()
                        .and_then(|raw| match self.parse_tie_breaker(raw) {
                            Ok(tie) => Some(tie),
                            Err(e) => {
                                tracing::debug!("Discarding tie-breaker start: {}", e);
                                None
                            }
                        });
                    return CursorSpec::From {
                        value,
                        tie_breaker_start,
                    };
                }
                Err(e) => tracing::debug!("Discarding from cursor: {}", e),
            }
        }

        CursorSpec::None
    }

    /// Parse a raw value of the ordered field
    pub fn parse_ordered(&self, raw: &str) -> Result<FieldValue> {
        self.ordered.field_type.parse(&self.ordered.name, raw)
    }

    /// Parse a raw value of the tie-breaker field
    pub fn parse_tie_breaker(&self, raw: &str) -> Result<FieldValue> {
        self.tie_breaker.field_type.parse(&self.tie_breaker.name, raw)
    }

    /// Build the filter predicate for a cursor
    pub fn build_predicate(&self, spec: &CursorSpec) -> Predicate {
        build_predicate(spec, &self.ordered.name, &self.tie_breaker.name)
    }

    /// The canonical sort order: ordered field, then tie-breaker, ascending
    pub fn sort_order(&self) -> Vec<OrderBy> {
        vec![
            OrderBy::asc(self.ordered.clone()),
            OrderBy::asc(self.tie_breaker.clone()),
        ]
    }
}

/// Build the filter predicate for a cursor over the named fields
///
/// - `None` matches everything
/// - `After(v)` is `ordered > v`
/// - `From(v)` is `ordered >= v`
/// - `From(v, t)` is `ordered > v OR (ordered = v AND tie_breaker >= t)`
pub fn build_predicate(
    spec: &CursorSpec,
    ordered_field: &str,
    tie_breaker_field: &str,
) -> Predicate {
    match spec {
        CursorSpec::None => Predicate::MatchAll,
        CursorSpec::After(value) => Predicate::greater_than(ordered_field, value.clone()),
        CursorSpec::From {
            value,
            tie_breaker_start: None,
        } => Predicate::greater_or_equal(ordered_field, value.clone()),
        CursorSpec::From {
            value,
            tie_breaker_start: Some(tie),
        } => Predicate::greater_than(ordered_field, value.clone()).or(Predicate::equal(
            ordered_field,
            value.clone(),
        )
        .and(Predicate::greater_or_equal(tie_breaker_field, tie.clone()))),
    }
}
