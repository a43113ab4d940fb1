//! HTTP surface: router, shared state and the three handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | process status and whether Gemini is configured |
//! | `POST /summarize` | JSON `{text, length?}` → summary + key points |
//! | `POST /extract-pdf` | multipart `file` → plain text |
//!
//! Every failure is answered with `{"error": "<message>"}`. Input and
//! configuration problems map to 400, bodies over the upload limit to 413,
//! collaborator and internal failures to 500 (see [`status_for`]).

use crate::config::{CorsOrigins, ServerConfig};
use crate::error::SummarizerError;
use crate::output::{ExtractResult, HealthStatus, SummarizeResponse};
use crate::pipeline::extract::{extract_text, is_pdf_filename, PdfTextExtractor, PdfiumExtractor};
use crate::pipeline::llm::{create_gemini_model, SummaryModel};
use crate::summarize::{summarize, SummaryRequest};
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// State shared by every handler. Cloning is cheap; nothing inside is mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when no API key is configured.
    pub model: Option<Arc<dyn SummaryModel>>,
    pub extractor: Arc<dyn PdfTextExtractor>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        model: Option<Arc<dyn SummaryModel>>,
        extractor: Arc<dyn PdfTextExtractor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            model,
            extractor,
        }
    }

    /// Production wiring: Gemini via `edgequake-llm`, PDFs via pdfium.
    pub fn from_config(config: ServerConfig) -> Self {
        let model = create_gemini_model(&config);
        Self::new(config, model, Arc::new(PdfiumExtractor))
    }
}

/// A [`SummarizerError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SummarizerError);

impl From<SummarizerError> for ApiError {
    fn from(e: SummarizerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// HTTP status for an error: 413 over the body limit, 400 when the caller can
/// fix it, else 500.
pub fn status_for(err: &SummarizerError) -> StatusCode {
    match err {
        SummarizerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the application router with CORS, body-limit and tracing layers.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/summarize", post(summarize_text))
        .route("/extract-pdf", post(extract_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the configured origins. All methods and headers are allowed.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        CorsOrigins::Any => base.allow_origin(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin '{}'", origin);
                        None
                    }
                })
                .collect();
            base.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<(), SummarizerError> {
    let addr = state.config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SummarizerError::Internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Server starting on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SummarizerError::Internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::healthy(state.model.is_some()))
}

async fn summarize_text(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let body = body.map_err(|e| {
        let err = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SummarizerError::PayloadTooLarge {
                limit: state.config.max_upload_bytes,
            }
        } else {
            SummarizerError::NoTextProvided
        };
        warn!("Rejected summarize body: {}", e.body_text());
        err
    })?;

    let request = SummaryRequest::from_json_body(&body).inspect_err(|e| {
        warn!("Rejected summarize request: {}", e);
    })?;

    let response = summarize(state.model.as_deref(), &request, &state.config.generation)
        .await
        .inspect_err(|e| error!("Summarization failed: {}", e))?;

    info!(
        "Summary ready: {} chars, {} key points",
        response.summary_length,
        response.key_points.len()
    );
    Ok(Json(response))
}

async fn extract_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResult>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Upload is not a multipart form: {}", e);
        SummarizerError::NoFileProvided
    })?;

    let (filename, bytes) = read_pdf_field(&mut multipart, state.config.max_upload_bytes)
        .await
        .inspect_err(|e| warn!("Rejected upload: {}", e))?;
    info!("Extracting text from '{}' ({} bytes)", filename, bytes.len());

    let result = extract_text(Arc::clone(&state.extractor), bytes)
        .await
        .inspect_err(|e| error!("Error extracting PDF '{}': {}", filename, e))?;

    info!(
        "Extracted {} words from {} pages",
        result.word_count, result.pages
    );
    Ok(Json(result))
}

/// Find the `file` part and read it, validating the filename first.
///
/// Parts without a filename are form fields, not uploads, and are skipped.
async fn read_pdf_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<(String, Vec<u8>), SummarizerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(SummarizerError::NoFileSelected);
        }
        if !is_pdf_filename(&filename) {
            return Err(SummarizerError::NotAPdf);
        }

        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(SummarizerError::NoFileProvided)
}

/// Map a multipart read error; body-limit hits become `PayloadTooLarge`.
fn multipart_error(e: MultipartError, limit: usize) -> SummarizerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SummarizerError::PayloadTooLarge { limit }
    } else {
        SummarizerError::PdfExtractionFailed {
            detail: e.body_text(),
        }
    }
}
