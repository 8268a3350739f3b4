//! HTTP API server implementation

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::TranslatorConfig;
use crate::core::engine::TranslationEngine;
use crate::core::errors::TranslationError;
use crate::core::models::{DocumentTranslation, Language, LanguagePair, TokenUsageReport};
use crate::processors;

/// Application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<TranslationEngine>,
}

impl AppState {
    pub fn new(engine: TranslationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Multipart form accepted by the translate endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TranslateDocumentForm {
    /// A .txt, .pdf or .docx document
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    source_language: Language,
    target_language: Language,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
    kind: &'static str,
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        let (status, code, kind) = match &err {
            TranslationError::InvalidLanguage { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_language",
                "invalid_request_error",
            ),
            TranslationError::SameLanguage => {
                (StatusCode::BAD_REQUEST, "same_language", "invalid_request_error")
            }
            TranslationError::MissingField { .. } => {
                (StatusCode::BAD_REQUEST, "missing_field", "invalid_request_error")
            }
            TranslationError::Extraction(_) => {
                (StatusCode::BAD_REQUEST, "extraction_error", "invalid_request_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "api_error"),
        };

        if !err.is_client_error() {
            warn!("Request failed: {}", err);
        }

        Self {
            status,
            message: err.to_string(),
            code,
            kind,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid multipart body: {}", err.body_text()),
            code: "invalid_request",
            kind: "invalid_request_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.message,
                code: self.code.to_string(),
                kind: self.kind.to_string(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Health check handler
#[utoipa::path(get, path = "/", responses((status = 200, body = HealthResponse)))]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Translate an uploaded document and report token savings
#[utoipa::path(
    post,
    path = "/translate-document/",
    request_body(content = TranslateDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = DocumentTranslation),
        (status = 400, description = "Same language, missing field or unreadable file", body = ErrorResponse),
        (status = 422, description = "Unknown language", body = ErrorResponse),
    )
)]
async fn translate_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DocumentTranslation>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut source_language: Option<String> = None;
    let mut target_language: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some((filename, bytes.to_vec()));
            }
            "source_language" => source_language = Some(field.text().await?),
            "target_language" => target_language = Some(field.text().await?),
            _ => {}
        }
    }

    let source: Language = required(source_language, "source_language")?.parse()?;
    let target: Language = required(target_language, "target_language")?.parse()?;
    let pair = LanguagePair::new(source, target)?;
    let (filename, bytes) = required(upload, "file")?;

    info!("Received {} ({} bytes)", filename, bytes.len());

    let extract_name = filename.clone();
    let text = tokio::task::spawn_blocking(move || processors::extract(&bytes, &extract_name))
        .await
        .map_err(|e| TranslationError::InternalError(e.to_string()))?
        .map_err(TranslationError::from)?;

    let response = state.engine.translate_document(&filename, &text, pair).await;
    Ok(Json(response))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, TranslationError> {
    value.ok_or_else(|| TranslationError::MissingField {
        field: field.to_string(),
    })
}

/// List provider models that support text generation
#[utoipa::path(get, path = "/models", responses((status = 200, body = [String])))]
async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let models = state.engine.list_generation_models().await?;
    Ok(Json(models))
}

/// OpenAPI description of this service
#[derive(OpenApi)]
#[openapi(
    paths(health_check, translate_document, list_models),
    components(schemas(
        HealthResponse,
        TranslateDocumentForm,
        DocumentTranslation,
        TokenUsageReport,
        Language,
        ErrorResponse,
        ErrorDetail
    ))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the router over a ready engine
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/translate-document/", post(translate_document))
        .route("/translate-document", post(translate_document))
        .route("/models", get(list_models))
        .route("/openapi.json", get(openapi))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    let engine = TranslationEngine::from_config(config)?;
    let app = router(AppState::new(engine));

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
