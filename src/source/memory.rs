//! In-memory record source

use super::RecordSource;
use crate::error::{Error, Result};
use crate::pagination::Predicate;
use crate::types::{FieldDef, FieldValue, JsonObject, JsonValue, OrderBy, OrderDirection, Record};
use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows held in memory
///
/// Rows can be inserted and updated between fetches, which makes this the
/// source of choice for exercising pagination under mutation.
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: RwLock<Vec<JsonObject>>,
}

impl MemorySource {
    /// Create a source from rows
    pub fn new(rows: Vec<JsonObject>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Create a source from JSON values, which must all be objects
    pub fn from_values(values: Vec<JsonValue>) -> Result<Self> {
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                JsonValue::Object(row) => Ok(row),
                other => Err(Error::source(format!(
                    "Row {i} is not an object: {other}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rows))
    }

    /// Append a row
    pub fn insert(&self, row: JsonObject) -> Result<()> {
        self.write()?.push(row);
        Ok(())
    }

    /// Apply `update` to every row whose `key` field equals `value`
    ///
    /// Returns the number of rows updated.
    pub fn update_where<F>(&self, key: &FieldDef, value: &FieldValue, mut update: F) -> Result<usize>
    where
        F: FnMut(&mut JsonObject),
    {
        let mut rows = self.write()?;
        let mut updated = 0;
        for row in rows.iter_mut() {
            if row.field_value(key).as_ref() == Some(value) {
                update(row);
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Set one field on every row whose `key` field equals `value`
    pub fn set_field(
        &self,
        key: &FieldDef,
        value: &FieldValue,
        field: &str,
        new_value: JsonValue,
    ) -> Result<usize> {
        self.update_where(key, value, |row| {
            row.insert(field.to_string(), new_value.clone());
        })
    }

    /// Number of rows
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<JsonObject>>> {
        self.rows
            .read()
            .map_err(|_| Error::source("Memory source lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<JsonObject>>> {
        self.rows
            .write()
            .map_err(|_| Error::source("Memory source lock poisoned"))
    }
}

impl RecordSource for MemorySource {
    type Record = JsonObject;

    fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        let rows = self.read()?;
        Ok(rows.iter().filter(|row| predicate.matches(*row)).count() as u64)
    }

    fn fetch_ordered(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: usize,
        count: usize,
    ) -> Result<Vec<JsonObject>> {
        let rows = self.read()?;
        let mut matching: Vec<&JsonObject> =
            rows.iter().filter(|row| predicate.matches(*row)).collect();

        matching.sort_by(|a, b| compare_rows(a, b, order));

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(count)
            .cloned()
            .collect())
    }
}

/// Compare rows by each order term in turn; missing values sort last
fn compare_rows(a: &JsonObject, b: &JsonObject, order: &[OrderBy]) -> Ordering {
    for term in order {
        let ordering = match (a.field_value(&term.field), b.field_value(&term.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = x.compare(&y).unwrap_or(Ordering::Equal);
                match term.direction {
                    OrderDirection::Asc => ordering,
                    OrderDirection::Desc => ordering.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
