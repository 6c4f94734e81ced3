//! DuckDB-backed record source
//!
//! Serves one table of a DuckDB database (file or in-memory). Keyset
//! predicates become parameterized `WHERE` clauses; an index on
//! `(ordered, tie-breaker)` keeps the slices cheap.

use super::sql::{self, SqlQuery};
use crate::error::{Error, Result};
use crate::pagination::Predicate;
use crate::source::RecordSource;
use crate::types::{JsonObject, JsonValue, OrderBy};
use duckdb::{params_from_iter, Connection};
use std::sync::{Mutex, MutexGuard};

/// In-memory database location
pub const IN_MEMORY: &str = ":memory:";

/// A DuckDB table used as a record source
pub struct DuckDbSource {
    /// DuckDB connection
    conn: Mutex<Connection>,
    /// Table rows are read from
    table: String,
    /// Database location (for logging)
    location: String,
}

impl std::fmt::Debug for DuckDbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSource")
            .field("table", &self.table)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl DuckDbSource {
    /// Open a database file (or `:memory:`) and serve `table` from it
    pub fn open(database: &str, table: impl Into<String>) -> Result<Self> {
        let conn = if database == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(database)
        }
        .map_err(|e| Error::config(format!("Failed to open DuckDB database '{database}': {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            table: table.into(),
            location: database.to_string(),
        })
    }

    /// Open an empty in-memory database
    pub fn in_memory(table: impl Into<String>) -> Result<Self> {
        Self::open(IN_MEMORY, table)
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            table: table.into(),
            location: "<connection>".to_string(),
        }
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Database location
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run one or more statements (schema setup, seeding, updates)
    pub fn execute_batch(&self, statements: &str) -> Result<()> {
        self.conn()?.execute_batch(statements)?;
        Ok(())
    }

    /// Check that the table can be queried
    pub fn check_connection(&self) -> Result<()> {
        let query = sql::count_query(&self.table, &Predicate::MatchAll);
        self.conn()?
            .query_row(&query.sql, [], |row| row.get::<_, i64>(0))
            .map_err(|e| Error::config(format!("Connection check failed: {e}")))?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::source("DuckDB connection lock poisoned"))
    }

    fn query_rows(&self, query: &SqlQuery) -> Result<Vec<JsonObject>> {
        tracing::debug!("Executing query: {}", query.sql);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&query.sql)?;
        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = JsonObject::new();
            for (i, column) in columns.iter().enumerate() {
                let value: duckdb::types::Value = row.get(i)?;
                record.insert(column.clone(), duckdb_value_to_json(value));
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl RecordSource for DuckDbSource {
    type Record = JsonObject;

    fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        let query = sql::count_query(&self.table, predicate);
        tracing::debug!("Executing query: {}", query.sql);

        let count: i64 = self.conn()?.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn fetch_ordered(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: usize,
        count: usize,
    ) -> Result<Vec<JsonObject>> {
        let query = sql::select_query(&self.table, predicate, order, offset, count);
        self.query_rows(&query)
    }
}

/// Convert DuckDB Value to JSON Value
///
/// Timestamps become ISO-8601 strings in UTC with microsecond precision.
fn duckdb_value_to_json(value: duckdb::types::Value) -> JsonValue {
    use duckdb::types::{TimeUnit, Value};

    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(i) => JsonValue::Number(i.into()),
        Value::SmallInt(i) => JsonValue::Number(i.into()),
        Value::Int(i) => JsonValue::Number(i.into()),
        Value::BigInt(i) => JsonValue::Number(i.into()),
        Value::HugeInt(i) => JsonValue::String(i.to_string()),
        Value::UTinyInt(i) => JsonValue::Number(i.into()),
        Value::USmallInt(i) => JsonValue::Number(i.into()),
        Value::UInt(i) => JsonValue::Number(i.into()),
        Value::UBigInt(i) => JsonValue::Number(i.into()),
        Value::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(JsonValue::Null, JsonValue::Number)
        }
        Value::Double(f) => serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s),
        Value::Blob(b) => JsonValue::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        Value::Timestamp(unit, i) => {
            let micros = match unit {
                TimeUnit::Second => i.saturating_mul(1_000_000),
                TimeUnit::Millisecond => i.saturating_mul(1_000),
                TimeUnit::Microsecond => i,
                TimeUnit::Nanosecond => i / 1_000,
            };
            chrono::DateTime::from_timestamp_micros(micros)
                .map(|dt| JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(JsonValue::Number(i.into()))
        }
        Value::Date32(d) => {
            // Days since epoch (719163 is the number of days from 1 CE to 1970-01-01)
            chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map(|date| JsonValue::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(JsonValue::Number(d.into()))
        }
        other => JsonValue::String(format!("{other:?}")),
    }
}
