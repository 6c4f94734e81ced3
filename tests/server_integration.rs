//! End-to-end tests of the list endpoint through the axum router

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use timeorder::cli::{router, AppState};
use timeorder::database::DuckDbSource;
use timeorder::types::parse_timestamp;
use timeorder::{Config, ListView, MemorySource, RecordSource};
use tower::ServiceExt;

const CONFIG: &str = r"
pagination:
  target_field: modified
  start_from_target_field: id
source:
  default_ordering:
    - { name: n, type: integer }
server:
  path: /records
";

/// Offsets (seconds after start) of the records with `n = 1..=6`.
/// Two records share a timestamp so the tie-breaker decides their order.
const OFFSETS: [i64; 6] = [40, 10, 30, 10, 60, 20];

struct Fixture {
    app: Router,
    start: DateTime<Utc>,
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn app_with<S>(source: S) -> Router
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: serde::Serialize + Send + 'static,
{
    let config = Config::from_yaml(CONFIG).unwrap();
    let state = AppState::new(Arc::new(source), ListView::from_config(&config));
    router(Arc::new(state), &config.server.path)
}

fn fixture() -> Fixture {
    let start = Utc::now();
    // ids run opposite to n
    let rows = OFFSETS
        .iter()
        .zip(1..=6_i64)
        .map(|(offset, n)| {
            json!({
                "id": 7 - n,
                "n": n,
                "modified": iso(start + Duration::seconds(*offset)),
            })
        })
        .collect();

    Fixture {
        app: app_with(MemorySource::from_values(rows).unwrap()),
        start,
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("host", "testserver")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn field(body: &Value, name: &str) -> Vec<i64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r[name].as_i64().unwrap())
        .collect()
}

fn query_map(link: &str) -> HashMap<String, String> {
    url::Url::parse(link)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(fixture().app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_from_returns_all_in_time_order() {
    let Fixture { app, start } = fixture();
    let uri = format!("/records?modified_from={}", iso(start));

    let (status, body) = get(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(6));
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["previous"], Value::Null);
    // (modified, id): n=2 and n=4 tie at +10s; id 3 (n=4) sorts before id 5 (n=2)
    assert_eq!(field(&body, "n"), vec![4, 2, 6, 3, 1, 5]);
    assert_eq!(field(&body, "id"), vec![3, 5, 1, 4, 6, 2]);
}

#[tokio::test]
async fn test_limit_at_least_all_has_no_next() {
    let Fixture { app, start } = fixture();
    let uri = format!("/records?modified_from={}&limit=6", iso(start));

    let (_, body) = get(app, &uri).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 6);
    assert_eq!(body["next"], Value::Null);
}

#[tokio::test]
async fn test_small_limit_links_to_boundary() {
    let Fixture { app, start } = fixture();
    let uri = format!("/records?modified_from={}&limit=2", iso(start));

    let (status, body) = get(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&body, "n"), vec![4, 2]);
    assert_eq!(body["count"], json!(6));

    let next = body["next"].as_str().unwrap();
    assert!(next.starts_with("http://testserver/records?"));
    let params = query_map(next);
    assert_eq!(params.len(), 3);
    assert_eq!(params["limit"], "2");
    assert_eq!(params["start_from_id"], "1");
    assert_eq!(
        parse_timestamp(&params["modified_from"]),
        Some(start + Duration::seconds(20))
    );

    // Following the links walks the rest without gaps
    let mut seen = field(&body, "n");
    let mut next = body["next"].as_str().map(str::to_string);
    while let Some(link) = next {
        let path = link.trim_start_matches("http://testserver");
        let (_, body) = get(app.clone(), path).await;
        seen.extend(field(&body, "n"));
        next = body["next"].as_str().map(str::to_string);
    }
    assert_eq!(seen, vec![4, 2, 6, 3, 1, 5]);
}

#[tokio::test]
async fn test_after_link_switches_to_from() {
    let Fixture { app, start } = fixture();
    let uri = format!(
        "/records?modified_after={}&limit=1",
        iso(start + Duration::seconds(10))
    );

    let (_, body) = get(app, &uri).await;
    assert_eq!(field(&body, "n"), vec![6]);
    assert_eq!(body["count"], json!(4));

    let params = query_map(body["next"].as_str().unwrap());
    assert!(!params.contains_key("modified_after"));
    assert_eq!(params["start_from_id"], "4");
    assert_eq!(
        parse_timestamp(&params["modified_from"]),
        Some(start + Duration::seconds(30))
    );
}

#[tokio::test]
async fn test_non_cursor_request_uses_default_ordering() {
    let (status, body) = get(fixture().app, "/records?limit=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&body, "n"), vec![1, 2, 3, 4]);
    assert_eq!(body["count"], json!(6));
    assert_eq!(body["next"], json!("http://testserver/records?limit=4&page=2"));
    assert_eq!(body["previous"], Value::Null);

    let (_, body) = get(fixture().app, "/records?limit=4&page=2").await;
    assert_eq!(field(&body, "n"), vec![5, 6]);
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["previous"], json!("http://testserver/records?limit=4"));
}

#[tokio::test]
async fn test_source_failure_is_500() {
    let app = app_with(DuckDbSource::in_memory("missing").unwrap());
    let (status, body) = get(app, "/records?modified_from=2024-01-01T00:00:00Z").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
}
