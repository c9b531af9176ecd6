use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::intake::{TriagePipeline, TriageReport};
use crate::application::monitor::CaseMonitor;
use crate::domain::case::CaseId;
use crate::domain::clinical::{ClinicalSnapshot, RiskTier};
use crate::domain::document::DocumentExtractor;
use crate::presentation::error::ApiError;

pub struct AppState {
    pub pipeline: Arc<TriagePipeline>,
    pub monitor: Arc<CaseMonitor>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub reports_dir: PathBuf,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_text))
        .route("/api/analyze-triage", post(analyze_snapshot))
        .route("/api/analyze-document", post(analyze_document))
        .route("/api/reports/{filename}", get(get_report))
        .route("/api/cases", post(start_case))
        .route("/api/cases/{id}", get(case_summary).delete(stop_case))
        .route("/api/cases/{id}/check", post(check_case))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: TriageReport,
    pub pdf_url: String,
}

impl From<TriageReport> for AnalyzeResponse {
    fn from(report: TriageReport) -> Self {
        let pdf_url = format!("/api/reports/{}", report.report_file);
        Self { report, pdf_url }
    }
}

#[derive(Deserialize)]
pub struct StartCaseRequest {
    pub case_id: Option<Uuid>,
    pub structured_data: ClinicalSnapshot,
    /// Registered tier; assessed from the snapshot when absent.
    pub risk_tier: Option<RiskTier>,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn analyze_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let report = state.pipeline.analyze_text(&payload.text).await?;
    Ok(Json(report.into()))
}

async fn analyze_snapshot(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<ClinicalSnapshot>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let report = state.pipeline.analyze_snapshot(snapshot).await?;
    Ok(Json(report.into()))
}

async fn analyze_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let text = state.extractor.extract_text(&content)?;
        let report = state.pipeline.analyze_text(&text).await?;
        return Ok(Json(report.into()));
    }
    Err(ApiError::BadRequest("missing multipart field: file".to_string()))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Reports are flat files; any path structure in the name is hostile.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::BadRequest("invalid report name".to_string()));
    }
    let path = state.reports_dir.join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("Report not found".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

async fn start_case(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartCaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let case_id = CaseId(payload.case_id.unwrap_or_else(Uuid::new_v4));
    let tier = match payload.risk_tier {
        Some(tier) => tier,
        None => {
            state
                .pipeline
                .assess(&payload.structured_data)
                .await?
                .risk_level
        }
    };
    let status = state
        .monitor
        .start_monitoring(case_id, payload.structured_data, tier)?;
    Ok((StatusCode::CREATED, Json(status)))
}

async fn check_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.monitor.check_case(CaseId(id)).await?;
    Ok(Json(status))
}

async fn case_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.monitor.get_case_summary(CaseId(id)).await?;
    Ok(Json(report))
}

async fn stop_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.monitor.stop_monitoring(CaseId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
