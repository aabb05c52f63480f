use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};

use super::{models::HealthResponse, state::AppState};
use crate::api::error::ApiError;
use crate::pipeline::process_batch;

/// Batch upload endpoint (POST /uploads)
///
/// ## Flow:
/// 1. Validate Content-Type (application/json, gzip etc. already decoded)
/// 2. Read the body, enforcing `server.max_payload_bytes`
/// 3. Parse the batch; missing or empty `files` is a 400
/// 4. Compress and upload every file
/// 5. Return 200 with `uploaded` (and `failed` under the isolate policy)
///
/// Any per-file failure under the fail-fast policy becomes a 500 carrying
/// the error message.
pub async fn upload_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;

    super::utils::parse_content_type(content_type)?;

    let body_bytes =
        super::utils::read_body(body, state.config.server.max_payload_bytes).await?;

    let request = super::validation::parse_batch_request(&body_bytes)?;
    drop(body_bytes);

    match process_batch(&state.batch, request).await {
        Ok(outcome) => {
            state.metrics.batch_accepted();
            state.metrics.files_uploaded(outcome.uploaded.len());
            if !outcome.failed.is_empty() {
                state.metrics.files_failed(outcome.failed.len());
            }

            Ok((StatusCode::OK, Json(outcome)))
        }
        Err(err) => {
            state.metrics.batch_failed();
            state.metrics.files_failed(1);
            tracing::error!(error = %err, "Batch failed");

            Err(err.into())
        }
    }
}

/// Health check endpoint (GET /health)
///
/// Reports component status and the in-process counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert("storage".to_string(), "healthy".to_string());

    let response = HealthResponse {
        status: "healthy".to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        counters: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
