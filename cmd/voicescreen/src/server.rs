//! HTTP API for voice screening.
//!
//! API endpoints:
//! - GET /             - liveness `{status, message}`
//! - POST /api/predict - multipart upload (field `file`), returns a PredictionResult

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use voicescreen_screening::{PredictionResult, Screener};

const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
struct AppState {
    screener: Arc<Screener>,
}

/// Error response body: `{"detail": "..."}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// Keeps the rejection's own status, e.g. 413 for an oversized body.
    fn multipart(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            detail: err.body_text(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Builds the API router.
pub fn router(screener: Arc<Screener>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/predict", post(predict))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(AppState { screener })
}

/// Start the HTTP server and run until it fails.
pub async fn start_server(addr: &str, screener: Arc<Screener>, max_upload_bytes: usize) -> Result<()> {
    let addr = parse_addr(addr)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, max_upload_bytes, "server started");
    info!("  - GET  /            liveness");
    info!("  - POST /api/predict screen an uploaded recording");

    axum::serve(listener, router(screener, max_upload_bytes)).await?;
    Ok(())
}

/// Parse address string to SocketAddr. A bare `:port` listens on all interfaces.
pub fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    addr.parse()
        .with_context(|| format!("invalid listen address {addr:?}"))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "voice screening service running",
    }))
}

async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResult>, ApiError> {
    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::multipart)?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field.bytes().await.map_err(ApiError::multipart)?;
            audio = Some(data);
            break;
        }
    }
    let audio = audio.ok_or_else(|| ApiError::bad_request(format!("missing multipart field {UPLOAD_FIELD:?}")))?;
    info!(bytes = audio.len(), "received upload");

    let screener = Arc::clone(&state.screener);
    let result = tokio::task::spawn_blocking(move || screener.predict(&audio))
        .await
        .map_err(|e| ApiError::internal(format!("prediction task failed: {e}")))?;

    match result {
        Ok(result) => {
            info!(
                probability = result.probability,
                classification = %result.classification,
                "prediction complete"
            );
            Ok(Json(result))
        }
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "prediction failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}
