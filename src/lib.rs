// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # timeorder
//!
//! Keyset ("time-ordered") pagination for record listings.
//!
//! Records are ordered by a mutable timestamp and an immutable tie-breaker.
//! Each page carries a continuation cursor `(timestamp, tie-breaker)` built
//! from the first record past the page, so a client can walk the whole set
//! forward even while records are being modified.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use timeorder::pagination::{CursorSpec, Limit, PageFetcher};
//! use timeorder::source::MemorySource;
//!
//! let source = MemorySource::from_values(rows)?;
//! let fetcher = PageFetcher::default();
//!
//! let mut cursor = CursorSpec::from_value(start);
//! loop {
//!     let page = fetcher.fetch(&source, &cursor, Limit::new(100))?;
//!     handle(page.items);
//!     match page.next_cursor {
//!         Some(next) => cursor = next,
//!         None => break,
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │          HTTP (axum) / CLI  →  ListView                   │
//! └───────────────────────────────────────────────────────────┘
//!                            │
//! ┌──────────────┬───────────┴──────────┬─────────────────────┐
//! │ CursorFilter │     PageFetcher      │   next link         │
//! │ after / from │ count, page, boundary│ `<field>_from` +    │
//! │ → Predicate  │ → next cursor        │ `start_from_<tie>`  │
//! └──────────────┴───────────┬──────────┴─────────────────────┘
//!                            │
//!               RecordSource: MemorySource | DuckDbSource
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Keyset pagination over time-ordered records
pub mod pagination;

/// Record sources
pub mod source;

/// Record source support via DuckDB
pub mod database;

/// Service configuration
pub mod config;

/// List endpoint logic
pub mod view;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Config;
pub use pagination::{CursorSpec, Page, PageFetcher, Predicate};
pub use source::{MemorySource, RecordSource};
pub use view::{ListView, PaginatedResponse};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
