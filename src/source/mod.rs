//! Record sources
//!
//! A record source answers the two reads pagination needs: how many records
//! match a predicate, and an ordered slice of them. Implementations:
//!
//! - [`MemorySource`] - rows held in memory, evaluated with [`Predicate::matches`]
//! - [`DuckDbSource`](crate::database::DuckDbSource) - a DuckDB table

mod memory;

pub use memory::MemorySource;

use crate::error::Result;
use crate::pagination::Predicate;
use crate::types::{OrderBy, Record};

/// Ordered, filterable collection of records
///
/// `Predicate::MatchAll` must match every record. Concurrency and
/// cancellation are the implementation's concern.
pub trait RecordSource {
    /// Row type returned by fetches
    type Record: Record;

    /// Count records matching the predicate
    fn count_matching(&self, predicate: &Predicate) -> Result<u64>;

    /// Fetch up to `count` matching records, sorted by `order`, skipping `offset`
    fn fetch_ordered(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: usize,
        count: usize,
    ) -> Result<Vec<Self::Record>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    type Record = S::Record;

    fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        (**self).count_matching(predicate)
    }

    fn fetch_ordered(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: usize,
        count: usize,
    ) -> Result<Vec<Self::Record>> {
        (**self).fetch_ordered(predicate, order, offset, count)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for std::sync::Arc<S> {
    type Record = S::Record;

    fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        (**self).count_matching(predicate)
    }

    fn fetch_ordered(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: usize,
        count: usize,
    ) -> Result<Vec<Self::Record>> {
        (**self).fetch_ordered(predicate, order, offset, count)
    }
}
