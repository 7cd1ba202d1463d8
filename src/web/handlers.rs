//! HTTP handlers

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::debug;

use crate::metrics;
use crate::store::{Record, StorageEngine};

/// Shared application state
pub type AppState = Arc<StorageEngine>;

/// Request rejected before it reaches the store
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

/// Store the record sent in the request body under `key`
///
/// The body has the same `{"value": ..., "expires"?: ...}` shape a read
/// returns. An `Expires` header in RFC 3339 form overrides the body field.
pub async fn write_object(
    State(engine): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let mut record = serde_json::from_slice::<Record>(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid object document: {}", e)))?;
    if let Some(expires) = parse_expires(&headers)? {
        record.expires = Some(expires);
    }

    debug!(%key, expires = ?record.expires, bytes = body.len(), "Writing object");
    engine.put(key, record);
    metrics::WRITES_TOTAL.inc();

    Ok(StatusCode::CREATED)
}

/// Return the record stored under `key`
pub async fn read_object(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Record>, ApiError> {
    metrics::READS_TOTAL.inc();
    match engine.get(&key) {
        Some(record) => Ok(Json(record)),
        None => {
            metrics::READ_MISSES_TOTAL.inc();
            debug!(%key, "Object not found");
            Err(ApiError::NotFound(format!("No object stored under '{}'", key)))
        }
    }
}

/// Remove `key`; deleting an absent key also succeeds
pub async fn delete_object(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> StatusCode {
    let existed = engine.delete(&key);
    metrics::DELETES_TOTAL.inc();
    debug!(%key, existed, "Deleted object");
    StatusCode::NO_CONTENT
}

pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    metrics::encode_metrics()
}

/// Store statistics
pub async fn stats_handler(State(engine): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(engine.stats()))
}

fn parse_expires(headers: &HeaderMap) -> Result<Option<DateTime<FixedOffset>>, ApiError> {
    let Some(raw) = headers.get(header::EXPIRES) else {
        return Ok(None);
    };

    let text = raw
        .to_str()
        .map_err(|_| ApiError::BadRequest("Invalid Expires header format".to_string()))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(text)
        .map(Some)
        .map_err(|_| ApiError::BadRequest("Invalid Expires header format".to_string()))
}
