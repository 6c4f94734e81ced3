//! Database integration tests with an in-memory DuckDB table

use pretty_assertions::assert_eq;
use test_case::test_case;
use timeorder::database::DuckDbSource;
use timeorder::pagination::{CursorSpec, Limit, Predicate};
use timeorder::types::parse_timestamp;
use timeorder::{FieldDef, FieldValue, JsonObject, OrderBy, PageFetcher, RecordSource, StringMap};

const SCHEMA: &str = "
CREATE TABLE records (id BIGINT NOT NULL, modified TIMESTAMP NOT NULL, name VARCHAR);
";

/// Eight rows; 12:00:05 is shared by ids 2, 4 and 8
const ROWS: &str = "
INSERT INTO records VALUES
    (1, TIMESTAMP '2024-01-01 12:00:09', 'one'),
    (2, TIMESTAMP '2024-01-01 12:00:05', 'two'),
    (3, TIMESTAMP '2024-01-01 12:00:01.250000', 'three'),
    (4, TIMESTAMP '2024-01-01 12:00:05', 'four'),
    (5, TIMESTAMP '2024-01-01 12:00:07', 'five'),
    (6, TIMESTAMP '2024-01-01 12:00:02', 'six'),
    (7, TIMESTAMP '2024-01-01 12:00:11', 'seven'),
    (8, TIMESTAMP '2024-01-01 12:00:05', 'eight');
";

const TIME_ORDER: [i64; 8] = [3, 6, 2, 4, 8, 5, 1, 7];

fn seeded() -> DuckDbSource {
    let source = DuckDbSource::in_memory("records").unwrap();
    source.execute_batch(SCHEMA).unwrap();
    source.execute_batch(ROWS).unwrap();
    source
}

fn at(raw: &str) -> FieldValue {
    FieldValue::Timestamp(parse_timestamp(raw).unwrap())
}

fn ids(rows: &[JsonObject]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

fn query(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_count_and_order_all() {
    let source = seeded();
    source.check_connection().unwrap();

    assert_eq!(source.count_matching(&Predicate::MatchAll).unwrap(), 8);

    let order = [
        OrderBy::asc(FieldDef::timestamp("modified")),
        OrderBy::asc(FieldDef::integer("id")),
    ];
    let rows = source
        .fetch_ordered(&Predicate::MatchAll, &order, 0, 100)
        .unwrap();
    assert_eq!(ids(&rows), TIME_ORDER.to_vec());
    assert_eq!(rows[0]["modified"], "2024-01-01T12:00:01.250000Z");
    assert_eq!(rows[0]["name"], "three");
}

#[test_case(1 ; "one per page")]
#[test_case(3 ; "three per page")]
#[test_case(8 ; "exactly all")]
#[test_case(13 ; "more than all")]
fn test_traversal(limit: usize) {
    let source = seeded();
    let fetcher = PageFetcher::default();

    let mut seen = Vec::new();
    let mut cursor = CursorSpec::from_value(at("2024-01-01T00:00:00Z"));
    loop {
        let page = fetcher.fetch(&source, &cursor, Limit::new(limit)).unwrap();
        assert!(page.items.len() <= limit);
        seen.extend(ids(&page.items));
        match page.next_cursor {
            Some(next) => cursor = next,
            None => break,
        }
    }

    assert_eq!(seen, TIME_ORDER.to_vec());
}

#[test]
fn test_boundary_inside_tie_group() {
    let source = seeded();
    let fetcher = PageFetcher::default();

    let page = fetcher
        .fetch(
            &source,
            &CursorSpec::from_value(at("2024-01-01T12:00:02Z")),
            Limit::new(2),
        )
        .unwrap();

    assert_eq!(ids(&page.items), vec![6, 2]);
    assert_eq!(page.total_count, 7);
    assert_eq!(
        page.next_cursor,
        Some(CursorSpec::From {
            value: at("2024-01-01T12:00:05Z"),
            tie_breaker_start: Some(FieldValue::Integer(4)),
        })
    );
}

#[test]
fn test_after_and_from_on_ties() {
    let source = seeded();
    let fetcher = PageFetcher::default();

    let after = fetcher
        .get_page(&source, &query(&[("modified_after", "2024-01-01T12:00:05Z")]))
        .unwrap();
    assert_eq!(ids(&after.items), vec![5, 1, 7]);

    let from = fetcher
        .get_page(&source, &query(&[("modified_from", "2024-01-01T12:00:05Z")]))
        .unwrap();
    assert_eq!(ids(&from.items), vec![2, 4, 8, 5, 1, 7]);

    let resumed = fetcher
        .get_page(
            &source,
            &query(&[
                ("modified_from", "2024-01-01T12:00:05+00:00"),
                ("start_from_id", "4"),
            ]),
        )
        .unwrap();
    assert_eq!(ids(&resumed.items), vec![4, 8, 5, 1, 7]);
    assert_eq!(resumed.total_count, 5);
}

#[test]
fn test_huge_limit_returns_everything() {
    let source = seeded();
    let fetcher = PageFetcher::new(
        timeorder::pagination::CursorFilter::new(
            FieldDef::timestamp("modified"),
            FieldDef::integer("id"),
        ),
        timeorder::pagination::LimitConfig::new(2, None),
        timeorder::pagination::QueryParamNames::default(),
    );

    let page = fetcher
        .get_page(
            &source,
            &query(&[
                ("modified_from", "2024-01-01T00:00:00Z"),
                ("limit", "18446744073709551615"),
            ]),
        )
        .unwrap();

    assert_eq!(ids(&page.items), TIME_ORDER.to_vec());
    assert_eq!(page.next_cursor, None);
}

#[test]
fn test_fractional_seconds_compare_exactly() {
    let source = seeded();
    let fetcher = PageFetcher::default();

    let page = fetcher
        .fetch(
            &source,
            &CursorSpec::after(at("2024-01-01T12:00:01.25Z")),
            Limit::new(1),
        )
        .unwrap();
    assert_eq!(ids(&page.items), vec![6]);

    let page = fetcher
        .fetch(
            &source,
            &CursorSpec::from_value(at("2024-01-01T12:00:01.25Z")),
            Limit::new(1),
        )
        .unwrap();
    assert_eq!(ids(&page.items), vec![3]);
}

#[test]
fn test_forward_update_between_pages() {
    let source = seeded();
    let fetcher = PageFetcher::default();

    let first = fetcher
        .fetch(
            &source,
            &CursorSpec::from_value(at("2024-01-01T00:00:00Z")),
            Limit::new(3),
        )
        .unwrap();
    assert_eq!(ids(&first.items), vec![3, 6, 2]);

    source
        .execute_batch("UPDATE records SET modified = TIMESTAMP '2024-01-01 13:00:00' WHERE id = 6;")
        .unwrap();

    let mut seen = Vec::new();
    let mut cursor = first.next_cursor;
    while let Some(spec) = cursor {
        let page = fetcher.fetch(&source, &spec, Limit::new(3)).unwrap();
        seen.extend(ids(&page.items));
        cursor = page.next_cursor;
    }

    assert_eq!(seen, vec![4, 8, 5, 1, 7, 6]);
}

#[test]
fn test_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.duckdb");
    let path = path.to_str().unwrap();

    {
        let source = DuckDbSource::open(path, "records").unwrap();
        source.execute_batch(SCHEMA).unwrap();
        source.execute_batch(ROWS).unwrap();
    }

    let source = DuckDbSource::open(path, "records").unwrap();
    assert_eq!(source.location(), path);
    assert_eq!(source.count_matching(&Predicate::MatchAll).unwrap(), 8);
}
