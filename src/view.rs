//! List endpoint logic
//!
//! A [`ListView`] decides per request between time-ordered pagination and
//! the default page-number pagination, and builds the response envelope.
//! It is transport-agnostic; the HTTP server and the CLI both drive it.

use crate::config::Config;
use crate::error::Result;
use crate::pagination::{build_next_link, build_page_link, PageFetcher, Predicate};
use crate::source::RecordSource;
use crate::types::{OrderBy, StringMap};
use serde::{Deserialize, Serialize};
use url::Url;

/// Response envelope of a list request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Link to the next page
    pub next: Option<String>,
    /// Link to the previous page (always null for time-ordered pages)
    pub previous: Option<String>,
    /// Matching records at the time of the request
    pub count: u64,
    /// Records of this page
    pub results: Vec<T>,
}

/// A paginated list endpoint
#[derive(Debug, Clone)]
pub struct ListView {
    fetcher: PageFetcher,
    default_order: Vec<OrderBy>,
    page_param: String,
}

impl ListView {
    /// Create a view
    pub fn new(
        fetcher: PageFetcher,
        default_order: Vec<OrderBy>,
        page_param: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            default_order,
            page_param: page_param.into(),
        }
    }

    /// Build the view described by a config
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pagination.fetcher(),
            config.source.default_order(),
            config.server.page_query_param.clone(),
        )
    }

    /// The time-ordered fetcher
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Answer one list request
    ///
    /// `request_url` is the absolute URL of the request; continuation links
    /// are derived from it.
    pub fn list<S: RecordSource>(
        &self,
        source: &S,
        request_url: &Url,
        query: &StringMap,
    ) -> Result<PaginatedResponse<S::Record>> {
        if self.fetcher.is_cursor_request(query) {
            let request = self.fetcher.prepare(query);
            if !request.spec.is_none() {
                let page = self.fetcher.fetch_request(source, &request)?;
                let next = page.next_cursor.as_ref().map(|cursor| {
                    build_next_link(request_url, self.fetcher.param_names(), cursor).to_string()
                });
                return Ok(PaginatedResponse {
                    next,
                    previous: None,
                    count: page.total_count,
                    results: page.items,
                });
            }
            tracing::debug!("No usable cursor in request, using page numbers");
        }

        self.list_by_page_number(source, request_url, query)
    }

    /// Default pagination: numbered pages over the default ordering
    fn list_by_page_number<S: RecordSource>(
        &self,
        source: &S,
        request_url: &Url,
        query: &StringMap,
    ) -> Result<PaginatedResponse<S::Record>> {
        let names = self.fetcher.param_names();
        let limit = self
            .fetcher
            .limits()
            .resolve(query.get(&names.limit).map(String::as_str))
            .get();
        let page = query
            .get(&self.page_param)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);

        let count = source.count_matching(&Predicate::MatchAll)?;
        let offset = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(limit);
        let results = source.fetch_ordered(&Predicate::MatchAll, &self.default_order, offset, limit)?;

        let seen = offset.saturating_add(results.len()) as u64;
        let next = (!results.is_empty() && seen < count)
            .then(|| build_page_link(request_url, &self.page_param, page + 1).to_string());
        let previous = (page > 1)
            .then(|| build_page_link(request_url, &self.page_param, page - 1).to_string());

        Ok(PaginatedResponse {
            next,
            previous,
            count,
            results,
        })
    }
}
