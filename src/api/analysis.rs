//! REST API endpoints for image upload and damage analysis

use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse, Responder};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::api::error::ApiError;
use crate::model::{AnalysisLevel, AnalysisRequest, AnalysisResult, DisasterType, ImageHandle};
use crate::service::{
    AnalysisOrchestrator, AnalysisOutcome, ExportService, ImageStore, ReportSnapshot, SessionStore,
};

/// `POST /v1/images` response
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    pub id: String,
    pub filename: String,
    pub size_bytes: usize,
}

/// `POST /v1/analysis` request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct RunAnalysisRequest {
    pub before_image_id: String,
    pub after_image_id: String,
    pub disaster_type: DisasterType,
    #[serde(default = "default_level")]
    pub analysis_level: AnalysisLevel,
}

fn default_level() -> AnalysisLevel {
    AnalysisLevel::Standard
}

/// `GET /v1/analysis/progress` response
#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    /// Increments with every new analysis request
    pub generation: u64,
    /// 0-100 for the live request
    pub progress: u8,
}

/// `GET /v1/analysis/{id}/export` query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub name: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
}

/// Upload one image into the session image store
#[utoipa::path(
    post,
    path = "/v1/images",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadedImage),
        (status = 400, description = "No file part in the request")
    ),
    tag = "analysis"
)]
#[post("/v1/images")]
pub async fn upload_image(
    images: web::Data<ImageStore>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload.png")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("empty file part".to_string()));
        }

        let size_bytes = bytes.len();
        let handle = images.insert(filename.clone(), bytes);
        tracing::info!(id = %handle.id, filename = %filename, size_bytes, "Image uploaded");

        return Ok(HttpResponse::Created().json(UploadedImage {
            id: handle.id,
            filename,
            size_bytes,
        }));
    }

    Err(ApiError::BadRequest("missing file part".to_string()))
}

/// Run a before/after damage analysis through the tier chain
#[utoipa::path(
    post,
    path = "/v1/analysis",
    request_body = RunAnalysisRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisOutcome),
        (status = 400, description = "Unknown image handles"),
        (status = 409, description = "Superseded by a newer request")
    ),
    tag = "analysis"
)]
#[post("/v1/analysis")]
pub async fn run_analysis(
    orchestrator: web::Data<AnalysisOrchestrator>,
    body: web::Json<RunAnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = AnalysisRequest {
        before: ImageHandle::new(body.before_image_id.clone()),
        after: ImageHandle::new(body.after_image_id.clone()),
        disaster_type: body.disaster_type,
        analysis_level: body.analysis_level,
    };

    let outcome = orchestrator.run_analysis(&request).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Progress of the live analysis request
#[utoipa::path(
    get,
    path = "/v1/analysis/progress",
    responses(
        (status = 200, description = "Live progress", body = ProgressResponse)
    ),
    tag = "analysis"
)]
#[get("/v1/analysis/progress")]
pub async fn analysis_progress(orchestrator: web::Data<AnalysisOrchestrator>) -> impl Responder {
    let (generation, progress) = orchestrator.progress();
    HttpResponse::Ok().json(ProgressResponse {
        generation,
        progress,
    })
}

/// Most recent analysis of the session
#[utoipa::path(
    get,
    path = "/v1/analysis/latest",
    responses(
        (status = 200, description = "Latest analysis", body = AnalysisResult),
        (status = 404, description = "No analysis has completed yet")
    ),
    tag = "analysis"
)]
#[get("/v1/analysis/latest")]
pub async fn latest_analysis(
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    match sessions.latest() {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::AnalysisNotFound("latest".to_string())),
    }
}

/// Get one retained analysis by id
#[utoipa::path(
    get,
    path = "/v1/analysis/{id}",
    params(
        ("id" = String, Path, description = "Analysis result id")
    ),
    responses(
        (status = 200, description = "Analysis found", body = AnalysisResult),
        (status = 404, description = "Analysis not found or evicted")
    ),
    tag = "analysis"
)]
#[get("/v1/analysis/{id}")]
pub async fn get_analysis(
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    match sessions.get(&id) {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::AnalysisNotFound(id)),
    }
}

/// Export one retained analysis as a verifiable snapshot
#[utoipa::path(
    get,
    path = "/v1/analysis/{id}/export",
    params(
        ("id" = String, Path, description = "Analysis result id"),
        ("name" = Option<String>, Query, description = "Snapshot name"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags")
    ),
    responses(
        (status = 200, description = "Snapshot produced", body = ReportSnapshot),
        (status = 404, description = "Analysis not found or evicted")
    ),
    tag = "analysis"
)]
#[get("/v1/analysis/{id}/export")]
pub async fn export_analysis(
    sessions: web::Data<SessionStore>,
    export: web::Data<ExportService>,
    path: web::Path<String>,
    query: web::Query<ExportParams>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let result = sessions
        .get(&id)
        .ok_or_else(|| ApiError::AnalysisNotFound(id.clone()))?;

    let name = query
        .name
        .clone()
        .unwrap_or_else(|| format!("analysis-{}", id));
    let tags = query
        .tags
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let snapshot = export.export(&result, name, tags).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Import a previously exported snapshot into the session
#[utoipa::path(
    post,
    path = "/v1/analysis/import",
    request_body = ReportSnapshot,
    responses(
        (status = 200, description = "Snapshot accepted", body = AnalysisResult),
        (status = 422, description = "Content hash mismatch")
    ),
    tag = "analysis"
)]
#[post("/v1/analysis/import")]
pub async fn import_analysis(
    sessions: web::Data<SessionStore>,
    export: web::Data<ExportService>,
    body: web::Json<ReportSnapshot>,
) -> Result<HttpResponse, ApiError> {
    let result = export.import(&body)?;
    if let Some(disaster_type) = sessions.active_disaster() {
        sessions.record(result.clone(), disaster_type);
    }
    tracing::info!(id = %result.id, "Imported report snapshot");
    Ok(HttpResponse::Ok().json(result))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_image)
        .service(run_analysis)
        .service(analysis_progress)
        .service(latest_analysis)
        .service(import_analysis)
        .service(export_analysis)
        .service(get_analysis);
}

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_image,
        run_analysis,
        analysis_progress,
        latest_analysis,
        get_analysis,
        export_analysis,
        import_analysis,
        crate::api::chat::chat,
        crate::api::chat::chat_history,
        crate::api::chat::clear_chat,
        crate::api::health::liveness,
        crate::api::health::readiness,
    ),
    components(schemas(
        UploadedImage,
        RunAnalysisRequest,
        ProgressResponse,
        AnalysisOutcome,
        AnalysisResult,
        ReportSnapshot,
        DisasterType,
        AnalysisLevel,
        crate::model::Severity,
        crate::model::SeverityBasis,
        crate::model::AnalysisSource,
        crate::model::DamageRecord,
        crate::model::BoundingRegion,
        crate::api::chat::ChatRequest,
        crate::api::chat::ChatResponse,
        crate::api::chat::ChatHistoryResponse,
        crate::client::ChatMessage,
        crate::service::LanguagePreference,
        crate::api::health::HealthStatus,
        crate::api::health::ReadinessStatus,
        crate::api::health::DependencyHealth,
    )),
    tags(
        (name = "analysis", description = "Image upload and damage analysis"),
        (name = "chat", description = "Knowledge-grounded assessment assistant"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
