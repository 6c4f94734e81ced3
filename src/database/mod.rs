//! Record source support via DuckDB
//!
//! This module serves a DuckDB table as a [`RecordSource`](crate::source::RecordSource).
//! Predicates and sort orders are rendered to SQL in [`sql`].

mod engine;
pub mod sql;

pub use engine::{DuckDbSource, IN_MEMORY};
