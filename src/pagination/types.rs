//! Pagination types
//!
//! Cursor specifications, raw request parameters and the page envelope
//! shared by the filter and the fetcher.

use super::limit::Limit;
use crate::types::{FieldValue, OptionStringExt, StringMap};

/// Logical cursor of one pagination request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CursorSpec {
    /// No cursor: the caller's default pagination applies
    #[default]
    None,
    /// Records strictly after `value` on the ordered field
    After(FieldValue),
    /// Records from `value` on the ordered field
    ///
    /// With a tie-breaker start, records equal to `value` are only included
    /// from that tie-breaker onwards.
    From {
        value: FieldValue,
        tie_breaker_start: Option<FieldValue>,
    },
}

impl CursorSpec {
    /// Create an `After` cursor
    pub fn after(value: impl Into<FieldValue>) -> Self {
        Self::After(value.into())
    }

    /// Create a `From` cursor without a tie-breaker
    pub fn from_value(value: impl Into<FieldValue>) -> Self {
        Self::From {
            value: value.into(),
            tie_breaker_start: None,
        }
    }

    /// Create a `From` cursor resuming at a tie-breaker
    pub fn from_tie_breaker(
        value: impl Into<FieldValue>,
        tie_breaker: impl Into<FieldValue>,
    ) -> Self {
        Self::From {
            value: value.into(),
            tie_breaker_start: Some(tie_breaker.into()),
        }
    }

    /// Check if this is the no-cursor case
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Query parameters that encode this cursor
    pub fn to_query_pairs(&self, names: &QueryParamNames) -> Vec<(String, String)> {
        match self {
            Self::None => Vec::new(),
            Self::After(value) => vec![(names.after.clone(), value.to_query_value())],
            Self::From {
                value,
                tie_breaker_start,
            } => {
                let mut pairs = vec![(names.from.clone(), value.to_query_value())];
                if let Some(tie) = tie_breaker_start {
                    pairs.push((names.start_from.clone(), tie.to_query_value()));
                }
                pairs
            }
        }
    }
}

/// Names of the query parameters recognized by the paginator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParamNames {
    /// e.g. `modified_after`
    pub after: String,
    /// e.g. `modified_from`
    pub from: String,
    /// e.g. `start_from_id`
    pub start_from: String,
    /// e.g. `limit`
    pub limit: String,
}

impl QueryParamNames {
    /// Default limit parameter name
    pub const DEFAULT_LIMIT_PARAM: &'static str = "limit";

    /// Derive names from `{}` templates
    pub fn from_templates(
        after_template: &str,
        from_template: &str,
        start_from_template: &str,
        target_field: &str,
        tie_breaker_field: &str,
        limit_override: Option<&str>,
    ) -> Self {
        Self {
            after: after_template.replace("{}", target_field),
            from: from_template.replace("{}", target_field),
            start_from: start_from_template.replace("{}", tie_breaker_field),
            limit: limit_override
                .unwrap_or(Self::DEFAULT_LIMIT_PARAM)
                .to_string(),
        }
    }
}

impl Default for QueryParamNames {
    fn default() -> Self {
        Self::from_templates("{}_after", "{}_from", "start_from_{}", "modified", "id", None)
    }
}

/// Raw, unparsed pagination parameters of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorParams {
    pub after: Option<String>,
    pub from: Option<String>,
    pub start_from: Option<String>,
    pub limit: Option<String>,
}

impl CursorParams {
    /// Pick the recognized parameters out of a query string map
    ///
    /// Empty values count as absent.
    pub fn extract(query: &StringMap, names: &QueryParamNames) -> Self {
        Self {
            after: query.get(&names.after).none_if_empty(),
            from: query.get(&names.from).none_if_empty(),
            start_from: query.get(&names.start_from).none_if_empty(),
            limit: query.get(&names.limit).none_if_empty(),
        }
    }

    /// Whether the request asked for time-ordered pagination at all
    pub fn is_cursor_request(&self) -> bool {
        self.after.is_some() || self.from.is_some()
    }
}

/// One request's pagination inputs, resolved once and passed along
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Resolved cursor
    pub spec: CursorSpec,
    /// Resolved page size
    pub limit: Limit,
}

/// Result of one fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    /// Records in `(ordered, tie-breaker)` order, at most `limit` of them
    pub items: Vec<R>,
    /// Records matching the cursor filter when the page was fetched
    pub total_count: u64,
    /// Cursor pointing at the first record past this page
    pub next_cursor: Option<CursorSpec>,
}

impl<R> Page<R> {
    /// Check if another page follows
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Map the items, keeping count and cursor
    pub fn map<T, F: FnMut(R) -> T>(self, f: F) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            next_cursor: self.next_cursor,
        }
    }
}
