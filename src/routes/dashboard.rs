use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppError;
use crate::response::DataResponse;
use crate::state::AppState;

use super::parse_i64;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/last_study_session", get(last_study_session))
        .route("/api/dashboard/study_progress", get(study_progress))
        .route("/api/dashboard/quick_stats", get(quick_stats))
}

#[derive(Debug, Default, Deserialize)]
struct ProgressQuery {
    days: Option<String>,
}

async fn last_study_session(State(state): State<AppState>) -> Result<Response, AppError> {
    // No sessions yet is a null payload, not an error.
    let session = state.sessions().last_session().await?;
    Ok(Json(DataResponse::new(session)).into_response())
}

async fn study_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Response, AppError> {
    let days = parse_i64(query.days.as_deref());
    let progress = state.sessions().study_progress(days).await?;
    Ok(Json(DataResponse::new(progress)).into_response())
}

async fn quick_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.sessions().quick_stats().await?;
    Ok(Json(DataResponse::new(stats)).into_response())
}
