//! Endpoint handlers.
//!
//! Each handler follows the same shape: resolve the query path first,
//! then hand the [`ResolvedPath`](crate::fs::ResolvedPath) to the
//! component doing the work. The client address is extracted once per
//! request and passed to the rate tracker unchanged.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::fs::{self, Disposition, FileStream};
use crate::http::error::ApiError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::security::rate_limit::Route;

/// Query shape shared by all three content endpoints.
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

/// `GET /api/v1/files` — JSON directory listing.
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<fs::DirectoryEntry>>, ApiError> {
    let dir = state.root.resolve(&query.path)?;
    let entries = fs::listing::list(&dir).await.map_err(|e| {
        tracing::debug!(
            request_id = request_id(&headers),
            path = %dir.as_path().display(),
            error = %e,
            "Listing failed"
        );
        e
    })?;
    Ok(Json(entries))
}

/// `GET /api/v1/download` — attachment download, throttled past the
/// per-client download limit.
pub async fn download(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    serve_file(state, addr, query, headers, Route::Download).await
}

/// `GET /api/v1/raw` — inline plain-text view, throttled past the
/// per-client raw limit.
pub async fn raw(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    serve_file(state, addr, query, headers, Route::Raw).await
}

async fn serve_file(
    state: AppState,
    addr: SocketAddr,
    query: PathQuery,
    headers: HeaderMap,
    route: Route,
) -> Result<Response<Body>, ApiError> {
    let path = state.root.resolve(&query.path)?;

    let (limit, disposition) = match route {
        Route::Download => (state.rate_limit.download_limit, Disposition::Attachment),
        Route::Raw => (state.rate_limit.raw_limit, Disposition::Inline),
    };
    let throttled = state.tracker.should_throttle(addr.ip(), route, limit);

    let stream = FileStream::open(&path).await?;
    if throttled {
        tracing::info!(
            request_id = request_id(&headers),
            client = %addr.ip(),
            route = ?route,
            path = %path.as_path().display(),
            bytes = stream.len(),
            "Client over limit, throttling transfer"
        );
    } else {
        tracing::debug!(
            request_id = request_id(&headers),
            client = %addr.ip(),
            route = ?route,
            path = %path.as_path().display(),
            bytes = stream.len(),
            "Streaming at full rate"
        );
    }

    let pace = throttled.then_some(state.rate_limit.throttle_bytes_per_sec);
    Ok(stream.into_response(disposition, pace))
}

/// `GET /` — 301 redirect to the public index, with the visit logged
/// (address + user agent).
pub async fn landing(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info!(client = %addr.ip(), user_agent, "Landing page hit, redirecting");
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.redirect_url.clone())],
    )
}
