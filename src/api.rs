/// HTTP API поверх аналитического ядра

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{seeded_rng, AnalysisConfig, PeriodNaming};
use crate::error::AnalyticsError;
use crate::models::insights::MIN_RECORDS;
use crate::models::{ClusteringEngine, CorrelationEngine, ForecastingModel, InsightGenerator};
use crate::pipeline;
use crate::preprocessing::RecordSanitizer;
use crate::sample::sample_rows;
use crate::types::{
    AnalysisReport, BusinessRecord, ClusterAssignment, CorrelationMatrix, ElbowPoint, ForecastOutput, Insight,
    MetricField, RawRow,
};

#[derive(Clone)]
pub struct AppState {
    defaults: Arc<AnalysisConfig>,
}

impl AppState {
    pub fn new(defaults: AnalysisConfig) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub rows: Vec<RawRow>,
    #[serde(default)]
    pub config: Option<AnalysisConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterRequest {
    pub rows: Vec<RawRow>,
    pub k: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ElbowRequest {
    pub rows: Vec<RawRow>,
    pub max_k: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub rows: Vec<RawRow>,
    pub metric: Option<MetricField>,
    pub periods_ahead: Option<usize>,
    pub period_naming: Option<PeriodNaming>,
}

#[derive(Debug, Deserialize)]
pub struct RowsRequest {
    pub rows: Vec<RawRow>,
}

/// Ошибка ядра в виде ответа 422
pub struct ApiError(AnalyticsError);

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("Request rejected: {}", self.0);
        let body = Json(serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/sample", get(sample))
        .route("/api/analyze", post(analyze))
        .route("/api/cluster", post(cluster))
        .route("/api/elbow", post(elbow))
        .route("/api/forecast", post(forecast))
        .route("/api/correlate", post(correlate))
        .route("/api/insights", post(insights))
        .layer(cors)
        .with_state(state)
}

/// Очистка + минимальный порог для аналитических операций
fn analysis_records(rows: &[RawRow]) -> Result<Vec<BusinessRecord>, AnalyticsError> {
    let records = RecordSanitizer::sanitize(rows)?;
    AnalyticsError::require("analysis", MIN_RECORDS, records.len())?;
    Ok(records)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Business Insights ML API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn sample() -> Json<Vec<RawRow>> {
    Json(sample_rows())
}

async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> ApiResult<AnalysisReport> {
    tracing::info!("Analyze request: {} rows", req.rows.len());
    let config = req.config.unwrap_or_else(|| state.defaults.as_ref().clone());
    Ok(Json(pipeline::analyze_with_config(&req.rows, &config)?))
}

async fn cluster(State(state): State<AppState>, Json(req): Json<ClusterRequest>) -> ApiResult<Vec<ClusterAssignment>> {
    tracing::info!("Cluster request: {} rows", req.rows.len());
    let records = analysis_records(&req.rows)?;
    let mut rng = seeded_rng(req.seed.or(state.defaults.seed));
    let k = req.k.unwrap_or(state.defaults.clusters);
    Ok(Json(ClusteringEngine::cluster(&records, k, &mut rng)?))
}

async fn elbow(State(state): State<AppState>, Json(req): Json<ElbowRequest>) -> ApiResult<Vec<ElbowPoint>> {
    tracing::info!("Elbow request: {} rows", req.rows.len());
    let records = analysis_records(&req.rows)?;
    let mut rng = seeded_rng(req.seed.or(state.defaults.seed));
    let max_k = req.max_k.unwrap_or(state.defaults.max_k);
    Ok(Json(ClusteringEngine::elbow(&records, max_k, &mut rng)?))
}

async fn forecast(State(state): State<AppState>, Json(req): Json<ForecastRequest>) -> ApiResult<ForecastOutput> {
    tracing::info!("Forecast request: {} rows", req.rows.len());
    let records = analysis_records(&req.rows)?;
    let naming = req.period_naming.unwrap_or_else(|| state.defaults.period_naming.clone());
    Ok(Json(ForecastingModel::forecast(
        &records,
        req.metric.unwrap_or(state.defaults.forecast_metric),
        req.periods_ahead.unwrap_or(state.defaults.periods_ahead),
        &naming,
    )?))
}

async fn correlate(Json(req): Json<RowsRequest>) -> ApiResult<CorrelationMatrix> {
    tracing::info!("Correlate request: {} rows", req.rows.len());
    let records = RecordSanitizer::sanitize(&req.rows)?;
    Ok(Json(CorrelationEngine::correlate(&records)?))
}

async fn insights(State(state): State<AppState>, Json(req): Json<ClusterRequest>) -> ApiResult<Vec<Insight>> {
    tracing::info!("Insights request: {} rows", req.rows.len());
    let records = analysis_records(&req.rows)?;
    let mut rng = seeded_rng(req.seed.or(state.defaults.seed));
    let clusters = ClusteringEngine::cluster(&records, req.k.unwrap_or(state.defaults.clusters), &mut rng)?;
    Ok(Json(InsightGenerator::generate(&records, &clusters)?))
}
