use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use restaurant_core::cache::{CacheRequest, CachedResponse, HttpFetcher, OfflineCache};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::AppError;

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub cache: Arc<OfflineCache<HttpFetcher>>,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(proxy)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    upstream: String,
    bucket: String,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        upstream: state.config.upstream.clone(),
        bucket: state.cache.bucket().name().to_string(),
    })
}

async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let request = to_cache_request(request).await?;
    let response = state.cache.handle(&request).await?;
    into_http_response(response)
}

async fn to_cache_request(request: Request) -> Result<CacheRequest, AppError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|error| AppError::BadRequest(format!("unreadable body: {error}")))?;

    Ok(CacheRequest {
        method: parts.method.to_string(),
        path_and_query,
        content_type,
        body: body.to_vec(),
    })
}

fn into_http_response(response: CachedResponse) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|_| AppError::internal(format!("invalid status {}", response.status)))?;
    let mut builder = http::Response::builder().status(status);
    if !response.content_type.is_empty() {
        builder = builder.header(CONTENT_TYPE, response.content_type);
    }
    builder
        .body(Body::from(response.body))
        .map_err(|error| AppError::internal(error.to_string()))
}
