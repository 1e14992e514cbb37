//! HTTP API server implementation

use axum::{
    extract::{
        connect_info::ConnectInfo,
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Request, State,
    },
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::core::catalog;
use crate::core::client::ServiceSet;
use crate::core::config::AppConfig;
use crate::core::errors::{FieldErrors, Result, ServiceError};
use crate::core::models::{Language, TranslationOutcome};
use crate::core::pipeline::TranslationPipeline;
use crate::core::rate_limit::RateLimiter;
use crate::processors;
use crate::processors::format::ExportFormat;
use crate::server::types::{
    ErrorBody, ExportPayload, HealthResponse, ImportResponse, LanguageItem, ModelItem, OptionItem,
    TranslatePayload,
};

/// Upper bound on uploaded document size
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state
pub struct AppState {
    pipeline: TranslationPipeline,
    limiter: RateLimiter,
    export_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: TranslationPipeline, limiter: RateLimiter, export_dir: PathBuf) -> Self {
        Self {
            pipeline,
            limiter,
            export_dir,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            TranslationPipeline::new(ServiceSet::from_config(config)?),
            RateLimiter::from_config(&config.rate_limit),
            config.export_dir(),
        ))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        list_languages,
        list_specialities,
        list_styles,
        list_complexity_levels,
        list_models,
        translate,
        import_document,
        export_document,
    ),
    components(schemas(
        LanguageItem,
        OptionItem,
        ModelItem,
        HealthResponse,
        ImportResponse,
        ErrorBody,
        TranslatePayload,
        ExportPayload,
        TranslationOutcome,
        Language,
        ExportFormat,
    )),
    tags((name = "simplify-translator", description = "Text simplification, translation and document conversion"))
)]
pub struct ApiDoc;

fn non_field_error(message: impl Into<String>) -> ServiceError {
    field_error("non_field_errors", message)
}

fn field_error(field: &str, message: impl Into<String>) -> ServiceError {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    ServiceError::ValidationError(errors)
}

fn json_rejection(rejection: JsonRejection) -> ServiceError {
    non_field_error(rejection.body_text())
}

/// Health check handler
#[utoipa::path(get, path = "/", responses((status = 200, body = HealthResponse)))]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: chrono::Utc::now().to_rfc3339(),
    })
}

fn options(values: &[&str]) -> Vec<OptionItem> {
    values
        .iter()
        .map(|v| OptionItem {
            name: v.to_string(),
            value: v.to_string(),
        })
        .collect()
}

#[utoipa::path(get, path = "/languages/", responses((status = 200, body = [LanguageItem])))]
async fn list_languages() -> Json<Vec<LanguageItem>> {
    Json(
        catalog::LANGUAGES
            .iter()
            .map(|(name, code)| LanguageItem {
                name: name.to_string(),
                code: code.to_string(),
            })
            .collect(),
    )
}

#[utoipa::path(get, path = "/specialities/", responses((status = 200, body = [OptionItem])))]
async fn list_specialities() -> Json<Vec<OptionItem>> {
    Json(options(catalog::SPECIALITIES))
}

#[utoipa::path(get, path = "/styles/", responses((status = 200, body = [OptionItem])))]
async fn list_styles() -> Json<Vec<OptionItem>> {
    Json(options(catalog::STYLES))
}

#[utoipa::path(get, path = "/complexity-levels/", responses((status = 200, body = [OptionItem])))]
async fn list_complexity_levels() -> Json<Vec<OptionItem>> {
    Json(options(catalog::COMPLEXITY_LEVELS))
}

#[utoipa::path(get, path = "/models/", responses((status = 200, body = [ModelItem])))]
async fn list_models() -> Json<Vec<ModelItem>> {
    Json(
        catalog::AVAILABLE_MODELS
            .iter()
            .map(|m| ModelItem { name: m.to_string() })
            .collect(),
    )
}

/// Simplify, score, translate and evaluate a text
#[utoipa::path(
    post,
    path = "/translate/",
    request_body = TranslatePayload,
    responses(
        (status = 200, body = TranslationOutcome),
        (status = 400, description = "Invalid fields"),
        (status = 429, body = ErrorBody),
        (status = 500, body = ErrorBody),
    )
)]
async fn translate(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TranslatePayload>, JsonRejection>,
) -> Result<Json<TranslationOutcome>> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let request = payload.validate()?;

    let outcome = state.pipeline.run(&request).await?;
    Ok(Json(outcome))
}

/// Extract plain text from an uploaded PDF, DOCX, EPUB or TXT file in field `file`
#[utoipa::path(
    post,
    path = "/import-document/",
    responses(
        (status = 200, body = ImportResponse),
        (status = 400, description = "Missing or empty file"),
        (status = 415, body = ErrorBody),
        (status = 429, body = ErrorBody),
        (status = 500, body = ErrorBody),
    )
)]
async fn import_document(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>> {
    let mut multipart = multipart.map_err(|e| non_field_error(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| non_field_error(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| non_field_error(e.body_text()))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(field_error("file", "No file was submitted."));
    };
    if filename.is_empty() {
        return Err(field_error("file", "No filename could be determined."));
    }
    if bytes.is_empty() {
        return Err(field_error("file", "The submitted file is empty."));
    }

    info!("Importing {} ({} bytes)", filename, bytes.len());
    let text = tokio::task::spawn_blocking(move || {
        processors::import::import_document(&filename, &bytes)
    })
    .await??;

    Ok(Json(ImportResponse { text }))
}

/// Render text and metrics as a PDF, DOCX or TXT attachment
#[utoipa::path(
    post,
    path = "/export-document/",
    request_body = ExportPayload,
    responses(
        (status = 200, description = "Rendered document as an attachment"),
        (status = 400, description = "Invalid fields"),
        (status = 429, body = ErrorBody),
        (status = 500, body = ErrorBody),
    )
)]
async fn export_document(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ExportPayload>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let job = payload.validate()?;
    let format = job.format;

    let dir = state.export_dir.clone();
    let path = tokio::task::spawn_blocking(move || {
        processors::export::export_document(&job, &dir)
    })
    .await??;

    let bytes = tokio::fs::read(&path).await;
    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
    let bytes = bytes?;

    let disposition = format!("attachment; filename=\"output.{}\"", format.extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Take a token from the caller's bucket before running the handler
async fn rate_limit(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    match state.limiter.check(client).await {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let limited = Router::new()
        .route("/translate/", post(translate))
        .route(
            "/import-document/",
            post(import_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/export-document/", post(export_document))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/", get(health_check))
        .route("/languages/", get(list_languages))
        .route("/specialities/", get(list_specialities))
        .route("/styles/", get(list_styles))
        .route("/complexity-levels/", get(list_complexity_levels))
        .route("/models/", get(list_models))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(limited)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
