//! Time-ordered keyset pagination
//!
//! Pages over records ordered by a mutable timestamp plus an immutable,
//! unique tie-breaker. A traversal that follows `next_cursor` visits every
//! record exactly once, even while records are being updated, as long as
//! the tie-breaker never changes.
//!
//! # Overview
//!
//! - [`CursorFilter`] turns cursor parameters into a [`Predicate`] and the
//!   `(ordered, tie-breaker)` sort order
//! - [`PageFetcher`] runs one round against a [`RecordSource`](crate::source::RecordSource)
//!   and derives the next cursor from the first record past the page
//! - [`LimitConfig`] resolves the page size from untrusted input
//! - [`build_next_link`] encodes the next cursor into a request URL

mod fetcher;
mod filter;
mod limit;
mod link;
mod predicate;
mod types;

pub use fetcher::PageFetcher;
pub use filter::{build_predicate, CursorFilter};
pub use limit::{Limit, LimitConfig};
pub use link::{build_next_link, build_page_link};
pub use predicate::Predicate;
pub use types::{CursorParams, CursorSpec, Page, PageRequest, QueryParamNames};
