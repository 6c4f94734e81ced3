//! One bounded keyset fetch
//!
//! A fetch issues three independent reads against the source: the count of
//! matching records, the page slice, and a one-record lookahead just past the
//! page. That record becomes the next cursor. The reads are not required to
//! see the same snapshot; the count is advisory.

use super::filter::CursorFilter;
use super::limit::{Limit, LimitConfig};
use super::types::{CursorParams, CursorSpec, Page, PageRequest, QueryParamNames};
use crate::error::{Error, Result};
use crate::source::RecordSource;
use crate::types::{FieldDef, Record, StringMap};

/// Executes keyset pagination rounds against a record source
#[derive(Debug, Clone)]
pub struct PageFetcher {
    filter: CursorFilter,
    limits: LimitConfig,
    names: QueryParamNames,
}

impl PageFetcher {
    /// Create a fetcher
    pub fn new(filter: CursorFilter, limits: LimitConfig, names: QueryParamNames) -> Self {
        Self {
            filter,
            limits,
            names,
        }
    }

    /// The cursor filter
    pub fn filter(&self) -> &CursorFilter {
        &self.filter
    }

    /// Limit resolution settings
    pub fn limits(&self) -> &LimitConfig {
        &self.limits
    }

    /// Recognized query parameter names
    pub fn param_names(&self) -> &QueryParamNames {
        &self.names
    }

    /// Whether a query asks for time-ordered pagination
    pub fn is_cursor_request(&self, query: &StringMap) -> bool {
        CursorParams::extract(query, &self.names).is_cursor_request()
    }

    /// Resolve a query into this request's cursor and limit
    pub fn prepare(&self, query: &StringMap) -> PageRequest {
        let params = CursorParams::extract(query, &self.names);
        PageRequest {
            spec: self.filter.resolve(&params),
            limit: self.limits.resolve(params.limit.as_deref()),
        }
    }

    /// Fetch one page for raw query parameters
    pub fn get_page<S: RecordSource>(
        &self,
        source: &S,
        query: &StringMap,
    ) -> Result<Page<S::Record>> {
        let request = self.prepare(query);
        self.fetch(source, &request.spec, request.limit)
    }

    /// Fetch one page for an already-resolved request
    pub fn fetch_request<S: RecordSource>(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<Page<S::Record>> {
        self.fetch(source, &request.spec, request.limit)
    }

    /// Fetch one page starting at `spec`
    ///
    /// Source errors propagate unchanged; nothing is retried.
    pub fn fetch<S: RecordSource>(
        &self,
        source: &S,
        spec: &CursorSpec,
        limit: Limit,
    ) -> Result<Page<S::Record>> {
        let predicate = self.filter.build_predicate(spec);
        let order = self.filter.sort_order();
        let limit = limit.get();

        tracing::debug!(%predicate, limit, "Fetching time-ordered page");

        let total_count = source.count_matching(&predicate)?;
        let items = source.fetch_ordered(&predicate, &order, 0, limit)?;
        let boundary = source.fetch_ordered(&predicate, &order, limit, 1)?;

        let next_cursor = match boundary.first() {
            Some(record) => Some(self.cursor_at(record)?),
            None => None,
        };

        Ok(Page {
            items,
            total_count,
            next_cursor,
        })
    }

    /// A `From` cursor positioned exactly at `record`
    pub fn cursor_at<R: Record + ?Sized>(&self, record: &R) -> Result<CursorSpec> {
        let ordered = self.filter.ordered_field();
        let tie_breaker = self.filter.tie_breaker_field();

        let value = record
            .field_value(ordered)
            .ok_or_else(|| Error::missing_field(&ordered.name))?;
        let tie = record
            .field_value(tie_breaker)
            .ok_or_else(|| Error::missing_field(&tie_breaker.name))?;

        Ok(CursorSpec::From {
            value,
            tie_breaker_start: Some(tie),
        })
    }
}

impl Default for PageFetcher {
    /// `modified` (timestamp) with `id` (integer) as tie-breaker
    fn default() -> Self {
        Self::new(
            CursorFilter::new(FieldDef::timestamp("modified"), FieldDef::integer("id")),
            LimitConfig::default(),
            QueryParamNames::default(),
        )
    }
}
