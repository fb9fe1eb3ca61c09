//! HTTP surface: upload form, generation endpoint, pin listing, health.
//!
//! Handlers are thin. They turn the multipart body into an
//! [`UploadedDocument`], hand it to the shared [`Orchestrator`] and map the
//! outcome to JSON. Every failure goes through the [`IntoResponse`] impl for
//! [`TestgenError`] so status codes and log levels live in one place.

use crate::config::ServiceConfig;
use crate::error::TestgenError;
use crate::orchestrator::Orchestrator;
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::pin::PinRecord;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Message returned with every successful generation.
pub const SUCCESS_MESSAGE: &str = "PDFs generated and uploaded to Pinata";

/// Name of the multipart field carrying the document.
const FILE_FIELD: &str = "file";

const DEFAULT_PIN_LIMIT: usize = 10;
const MAX_PIN_LIMIT: usize = 1000;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared, read-only request state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: ServiceConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }
}

/// Body of a successful `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    pub original_cid: String,
    pub generated_cid: String,
}

#[derive(Debug, Deserialize)]
pub struct PinsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PinsResponse {
    pub pins: Vec<PinRecord>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/pins", get(list_pins))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, TestgenError> {
    let multipart = multipart.map_err(|e| TestgenError::MalformedUpload {
        detail: e.body_text(),
        too_large: false,
    })?;
    let upload = read_upload(multipart).await?;
    let output = state.orchestrator.run(upload).await?;

    Ok(Json(GenerateResponse {
        message: SUCCESS_MESSAGE.to_string(),
        original_cid: output.original.cid,
        generated_cid: output.generated.cid,
    }))
}

async fn list_pins(
    State(state): State<AppState>,
    Query(query): Query<PinsQuery>,
) -> Result<Json<PinsResponse>, TestgenError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PIN_LIMIT)
        .clamp(1, MAX_PIN_LIMIT);
    let pins = state.orchestrator.list_pins(limit).await?;
    Ok(Json(PinsResponse { pins }))
}

/// Pull the `file` part out of the multipart body.
///
/// Parts with other names, and `file` parts that are not file uploads (no
/// filename attribute), are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedDocument, TestgenError> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Ignoring '{}' part without a filename", FILE_FIELD);
            continue;
        };
        if filename.trim().is_empty() {
            return Err(TestgenError::EmptyFilename);
        }
        let bytes = field.bytes().await.map_err(malformed)?;
        return UploadedDocument::new(&filename, bytes);
    }
    Err(TestgenError::NoFile)
}

fn malformed(e: MultipartError) -> TestgenError {
    TestgenError::MalformedUpload {
        too_large: e.status() == StatusCode::PAYLOAD_TOO_LARGE,
        detail: e.body_text(),
    }
}

// ── Error responses ──────────────────────────────────────────────────────

impl TestgenError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TestgenError::MalformedUpload {
                too_large: true, ..
            } => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TestgenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Client error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, PinningError};

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(TestgenError::NoFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TestgenError::ExtractionEmpty { pages: 1 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TestgenError::DocumentParse {
                detail: "bad xref".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        let err = TestgenError::MalformedUpload {
            detail: "length limit exceeded".into(),
            too_large: true,
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn backend_errors_map_to_500() {
        let gen = TestgenError::from(GenerationError::EmptyResponse);
        let pin = TestgenError::from(PinningError::MissingCredentials);
        assert_eq!(gen.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(pin.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            TestgenError::Internal("task cancelled".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn index_page_posts_file_field() {
        assert!(INDEX_HTML.contains("Test Case Generator"));
        assert!(INDEX_HTML.contains(r#"name="file""#));
        assert!(INDEX_HTML.contains(r#"action="/generate""#));
    }
}
