use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::{header, StatusCode};
use actix_web::{
    dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::use_cases::exporter::validate_base_name;
use crate::application::{AccessGuard, Exporter, Importer, InventoryImport, MatchReview};
use crate::domain::error::{AppError, Result};
use crate::domain::inventory::inventory_columns;
use crate::domain::rfp::{match_review_columns, MatchStatus};
use crate::domain::session::UserRole;
use crate::domain::tabular::{validate_mapping, ColumnMapping, ExportFormat, ParseOutcome, RowRecord};
use crate::infrastructure::config::{AppConfig, ExportConfig, ServerConfig};
use crate::infrastructure::session::SessionProvider;
use crate::infrastructure::storage::{DirectorySink, ExportFile, FileSink};
use crate::infrastructure::store::RecordStore;

pub struct HttpState {
    pub guard: AccessGuard,
    pub store: Arc<dyn RecordStore>,
    pub importer: Arc<Importer>,
    pub inventory_import: InventoryImport,
    pub match_review: MatchReview,
    pub exporter: Exporter,
    pub archive: Option<Arc<dyn FileSink>>,
    pub export: ExportConfig,
}

impl HttpState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        let archive = config
            .export
            .archive_dir
            .clone()
            .map(|dir| Arc::new(DirectorySink::new(dir)) as Arc<dyn FileSink>);

        Self {
            guard: AccessGuard::new(sessions),
            store: store.clone(),
            importer: Arc::new(Importer::new(config.import.clone())),
            inventory_import: InventoryImport::new(store.clone()),
            match_review: MatchReview::new(store),
            exporter: Exporter::new(),
            archive,
            export: config.export.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Deserialize)]
pub struct CustomExportRequest {
    #[serde(default)]
    pub format: ExportFormat,
    pub mapping: Vec<ColumnMapping>,
    #[serde(default)]
    pub base_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub status: MatchStatus,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_)
            | AppError::StoreError(_)
            | AppError::ExportError(_)
            | AppError::ConfigError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/me")]
async fn current_session(
    req: HttpRequest,
    data: web::Data<HttpState>,
) -> Result<HttpResponse> {
    let session = data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/inventory")]
async fn list_inventory(
    req: HttpRequest,
    data: web::Data<HttpState>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let items = data.store.list_inventory().await?;
    Ok(HttpResponse::Ok().json(items))
}

#[post("/imports/preview")]
async fn preview_import(
    req: HttpRequest,
    data: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let outcome = parse_upload(&data, query.into_inner().file_name, body).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/inventory/import")]
async fn import_inventory(
    req: HttpRequest,
    data: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let session = data.guard.authorize(bearer_token(&req), UserRole::Admin).await?;
    info!(user_id = %session.user_id, bytes = body.len(), "Inventory import requested");

    let outcome = parse_upload(&data, query.into_inner().file_name, body).await?;
    let report = data.inventory_import.import(outcome).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[get("/inventory/export")]
async fn export_inventory(
    req: HttpRequest,
    data: web::Data<HttpState>,
    query: web::Query<FormatQuery>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let rows = inventory_rows(&data).await?;
    let base_name = data.export.inventory_base_name.clone();
    let file = render_export(&data, rows, inventory_columns(), base_name, query.format).await?;
    Ok(download(file))
}

#[post("/inventory/export")]
async fn export_inventory_custom(
    req: HttpRequest,
    data: web::Data<HttpState>,
    body: web::Json<CustomExportRequest>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let request = body.into_inner();
    validate_mapping(&request.mapping)?;

    let base_name = match request.base_name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => data.export.inventory_base_name.clone(),
    };
    validate_base_name(&base_name)?;
    let rows = inventory_rows(&data).await?;
    let file = render_export(&data, rows, request.mapping, base_name, request.format).await?;
    Ok(download(file))
}

#[get("/rfps/{rfp_id}/items")]
async fn list_rfp_items(
    req: HttpRequest,
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let items = data.match_review.items(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(items))
}

#[get("/rfp-items/{id}/matches")]
async fn list_matches(
    req: HttpRequest,
    data: web::Data<HttpState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let views = data.match_review.suggestions(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views))
}

#[post("/matches/{id}/review")]
async fn review_match(
    req: HttpRequest,
    data: web::Data<HttpState>,
    path: web::Path<i64>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse> {
    let session = data.guard.authorize(bearer_token(&req), UserRole::Reviewer).await?;
    let updated = data
        .match_review
        .review(path.into_inner(), body.status, &session)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/rfps/{rfp_id}/matches/export")]
async fn export_matches(
    req: HttpRequest,
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    query: web::Query<FormatQuery>,
) -> Result<HttpResponse> {
    data.guard.authorize(bearer_token(&req), UserRole::Viewer).await?;
    let rows = data.match_review.review_rows(path.into_inner()).await?;
    let base_name = data.export.matches_base_name.clone();
    let file = render_export(&data, rows, match_review_columns(), base_name, query.format).await?;
    Ok(download(file))
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn inventory_rows(data: &HttpState) -> Result<Vec<RowRecord>> {
    let items = data.store.list_inventory().await?;
    Ok(items.iter().map(|item| item.to_row()).collect())
}

/// Parsing is CPU-bound; keep it off the async workers
async fn parse_upload(
    data: &HttpState,
    file_name: Option<String>,
    body: web::Bytes,
) -> Result<ParseOutcome> {
    let importer = data.importer.clone();
    tokio::task::spawn_blocking(move || importer.parse_upload(file_name.as_deref(), &body))
        .await
        .map_err(|e| AppError::Internal(format!("Import task failed: {}", e)))
}

async fn render_export(
    data: &HttpState,
    rows: Vec<RowRecord>,
    mapping: Vec<ColumnMapping>,
    base_name: String,
    format: ExportFormat,
) -> Result<ExportFile> {
    let exporter = data.exporter;
    let archive = data.archive.clone();

    tokio::task::spawn_blocking(move || -> Result<ExportFile> {
        let file = exporter.render(&rows, &mapping, &base_name, format)?;
        if let Some(sink) = archive {
            // The download still succeeds when archiving fails
            match sink.save(&file) {
                Ok(location) => info!(location = %location, "Export archived"),
                Err(e) => warn!(error = %e, file_name = %file.file_name, "Export archive failed"),
            }
        }
        Ok(file)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Export task failed: {}", e)))?
}

fn download(file: ExportFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(file.mime_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ))
        .body(file.bytes)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api")
            .service(current_session)
            .service(list_inventory)
            .service(preview_import)
            .service(import_inventory)
            .service(export_inventory)
            .service(export_inventory_custom)
            .service(list_rfp_items)
            .service(list_matches)
            .service(review_match)
            .service(export_matches),
    );
}

fn cors(config: &ServerConfig) -> Cors {
    match &config.allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec![header::CONTENT_DISPOSITION]),
        None => Cors::permissive(),
    }
}

pub fn start_server(state: HttpState, config: &ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let server_config = config.clone();
    let payload_limit = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&server_config))
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
