use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::analysis::AnalysisSummary;
use super::domain::DrivingInput;
use super::import::BulkImporter;
use super::session::{AnalysisSession, SessionError};
use crate::error::AppError;

/// Router builder exposing submission, refresh, and batch scoring endpoints.
pub fn analysis_router(session: Arc<AnalysisSession>) -> Router {
    Router::new()
        .route("/api/v1/analysis", post(analyze_handler))
        .route("/api/v1/analysis/current", get(current_handler))
        .route("/api/v1/analysis/report", post(regenerate_handler))
        .route("/api/v1/analysis/batch", post(batch_handler))
        .with_state(session)
}

pub(crate) async fn analyze_handler(
    State(session): State<Arc<AnalysisSession>>,
    Json(input): Json<DrivingInput>,
) -> Result<Response, AppError> {
    let result = session.analyze(input.into_record()).await?;
    Ok(Json(result.as_ref()).into_response())
}

pub(crate) async fn current_handler(
    State(session): State<Arc<AnalysisSession>>,
) -> Result<Response, AppError> {
    let result = session.current().await.ok_or(SessionError::NoAnalysis)?;
    Ok(Json(result.as_ref()).into_response())
}

pub(crate) async fn regenerate_handler(
    State(session): State<Arc<AnalysisSession>>,
) -> Result<Response, AppError> {
    let result = session.regenerate().await?;
    Ok(Json(result.as_ref()).into_response())
}

/// Scores a CSV export without generating reports.
pub(crate) async fn batch_handler(body: String) -> Result<Json<Vec<AnalysisSummary>>, AppError> {
    let records = BulkImporter::from_reader(body.as_bytes())?;
    Ok(Json(records.iter().map(AnalysisSummary::from_record).collect()))
}
