//! SQL rendering for predicates and sort orders
//!
//! Field names come from configuration and are always quoted. Values are
//! bound as parameters, never interpolated.

use crate::pagination::Predicate;
use crate::types::{FieldValue, OrderBy, OrderDirection};
use duckdb::types::Value;

/// A SQL statement with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Quote an identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified table name
pub fn quote_table(name: &str) -> String {
    name.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
}

/// Render a predicate as a boolean SQL expression, appending its parameters
pub fn render_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::MatchAll => "TRUE".to_string(),
        Predicate::GreaterThan { field, value } => {
            format!("{} > {}", quote_ident(field), bind(value, params))
        }
        Predicate::GreaterOrEqual { field, value } => {
            format!("{} >= {}", quote_ident(field), bind(value, params))
        }
        Predicate::Equal { field, value } => {
            format!("{} = {}", quote_ident(field), bind(value, params))
        }
        Predicate::And(a, b) => {
            let a = render_predicate(a, params);
            let b = render_predicate(b, params);
            format!("({a} AND {b})")
        }
        Predicate::Or(a, b) => {
            let a = render_predicate(a, params);
            let b = render_predicate(b, params);
            format!("({a} OR {b})")
        }
    }
}

/// Render an `ORDER BY` clause; empty when there is nothing to order by
pub fn render_order(order: &[OrderBy]) -> String {
    if order.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = order
        .iter()
        .map(|term| {
            let direction = match term.direction {
                OrderDirection::Asc => "ASC",
                OrderDirection::Desc => "DESC",
            };
            format!("{} {direction} NULLS LAST", quote_ident(&term.field.name))
        })
        .collect();
    format!(" ORDER BY {}", terms.join(", "))
}

/// `SELECT COUNT(*)` over the matching rows
pub fn count_query(table: &str, predicate: &Predicate) -> SqlQuery {
    let mut params = Vec::new();
    let filter = render_predicate(predicate, &mut params);
    SqlQuery {
        sql: format!("SELECT COUNT(*) FROM {} WHERE {filter}", quote_table(table)),
        params,
    }
}

/// `SELECT *` of one ordered slice of the matching rows
pub fn select_query(
    table: &str,
    predicate: &Predicate,
    order: &[OrderBy],
    offset: usize,
    count: usize,
) -> SqlQuery {
    let mut params = Vec::new();
    let filter = render_predicate(predicate, &mut params);
    SqlQuery {
        sql: format!(
            "SELECT * FROM {} WHERE {filter}{} LIMIT {} OFFSET {}",
            quote_table(table),
            render_order(order),
            bigint(count),
            bigint(offset)
        ),
        params,
    }
}

/// DuckDB takes `LIMIT` and `OFFSET` as BIGINT
fn bigint(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn bind(value: &FieldValue, params: &mut Vec<Value>) -> String {
    match value {
        FieldValue::Timestamp(ts) => {
            params.push(Value::Text(
                ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            ));
            "CAST(? AS TIMESTAMP)".to_string()
        }
        FieldValue::Integer(i) => {
            params.push(Value::BigInt(*i));
            "?".to_string()
        }
        FieldValue::Text(s) => {
            params.push(Value::Text(s.clone()));
            "?".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{build_predicate, CursorSpec};
    use crate::types::FieldDef;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("modified"), "\"modified\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_table("main.records"), "\"main\".\"records\"");
    }

    #[test]
    fn test_slice_bounds_fit_bigint() {
        let query = select_query("records", &Predicate::MatchAll, &[], usize::MAX, usize::MAX);
        assert_eq!(
            query.sql,
            format!(
                "SELECT * FROM \"records\" WHERE TRUE LIMIT {0} OFFSET {0}",
                i64::MAX
            )
        );
    }

    #[test]
    fn test_render_match_all() {
        let query = count_query("records", &Predicate::MatchAll);
        assert_eq!(query.sql, "SELECT COUNT(*) FROM \"records\" WHERE TRUE");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_render_from_with_tie_breaker() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let spec = CursorSpec::from_tie_breaker(ts, 42);
        let predicate = build_predicate(&spec, "modified", "id");

        let mut params = Vec::new();
        let sql = render_predicate(&predicate, &mut params);
        assert_eq!(
            sql,
            "(\"modified\" > CAST(? AS TIMESTAMP) OR (\"modified\" = CAST(? AS TIMESTAMP) AND \"id\" >= ?))"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("2024-05-06 07:08:09.000000".to_string()),
                Value::Text("2024-05-06 07:08:09.000000".to_string()),
                Value::BigInt(42),
            ]
        );
    }

    #[test]
    fn test_select_query_orders_and_slices() {
        let order = vec![
            OrderBy::asc(FieldDef::timestamp("modified")),
            OrderBy::asc(FieldDef::integer("id")),
        ];
        let query = select_query("records", &Predicate::MatchAll, &order, 10, 5);
        assert_eq!(
            query.sql,
            "SELECT * FROM \"records\" WHERE TRUE ORDER BY \"modified\" ASC NULLS LAST, \"id\" ASC NULLS LAST LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_render_order_empty() {
        assert_eq!(render_order(&[]), "");
    }
}
