//! HTTP server mode serving a paginated list endpoint

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::source::RecordSource;
use crate::types::StringMap;
use crate::view::ListView;

/// Host used when a request carries no `Host` header
const DEFAULT_HOST: &str = "localhost";

/// App state shared across handlers
pub struct AppState<S> {
    /// Records served by the list endpoint
    pub source: Arc<S>,
    /// Pagination behaviour of the list endpoint
    pub view: ListView,
}

impl<S> AppState<S> {
    /// Create app state
    pub fn new(source: Arc<S>, view: ListView) -> Self {
        Self { source, view }
    }
}

/// Build the router: `GET /health` and `GET <path>`
pub fn router<S>(state: Arc<AppState<S>>, path: &str) -> Router
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: Serialize + Send + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(path, get(list_records::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve<S>(config: &Config, source: Arc<S>, port: u16) -> Result<()>
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: Serialize + Send + 'static,
{
    let state = Arc::new(AppState::new(source, ListView::from_config(config)));
    let app = router(state, &config.server.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(
        "Starting HTTP server on http://{}{}",
        addr,
        config.server.path
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Paginated list endpoint
async fn list_records<S>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<StringMap>,
) -> Response
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: Serialize + Send + 'static,
{
    let request_url = match request_url(&headers, &uri) {
        Ok(url) => url,
        Err(e) => return error_response(&e),
    };

    // Sources are synchronous; keep them off the async workers
    let result = tokio::task::spawn_blocking(move || {
        state.view.list(state.source.as_ref(), &request_url, &query)
    })
    .await
    .unwrap_or_else(|e| Err(Error::Other(format!("List task failed: {e}"))));

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Absolute URL of a request, as seen by the client
fn request_url(headers: &HeaderMap, uri: &Uri) -> Result<Url> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_HOST);
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);

    Ok(Url::parse(&format!("http://{host}{path_and_query}"))?)
}

fn error_response(error: &Error) -> Response {
    let status = if error.is_input_error() {
        tracing::warn!("Rejected list request: {}", error);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("List request failed: {}", error);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(json!({ "detail": error.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "testserver".parse().unwrap());
        let uri: Uri = "/data/?limit=2".parse().unwrap();

        let url = request_url(&headers, &uri).unwrap();
        assert_eq!(url.as_str(), "http://testserver/data/?limit=2");
    }

    #[test]
    fn test_request_url_defaults_host() {
        let uri: Uri = "/records".parse().unwrap();
        let url = request_url(&HeaderMap::new(), &uri).unwrap();
        assert_eq!(url.as_str(), "http://localhost/records");
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(&Error::source("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error_response(&Error::invalid_limit("x"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
