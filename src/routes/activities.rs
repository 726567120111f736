use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::listing::Pagination;
use crate::models::SessionWithStats;
use crate::response::DataResponse;
use crate::state::AppState;

use super::ListQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/study_activities",
            get(list_activities).post(create_activity),
        )
        .route(
            "/api/study_activities/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route(
            "/api/study_activities/:id/study_sessions",
            get(list_activity_sessions),
        )
}

#[derive(Debug, Deserialize)]
struct ActivityPayload {
    name: String,
    url: String,
}

#[derive(Serialize)]
struct ActivitySessionsData {
    study_sessions: Vec<SessionWithStats>,
    pagination: Pagination,
}

async fn list_activities(State(state): State<AppState>) -> Result<Response, AppError> {
    let activities = state.activities().list_activities().await?;
    Ok(Json(DataResponse::new(activities)).into_response())
}

async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let activity = state.activities().get_activity(id).await?;
    Ok(Json(DataResponse::new(activity)).into_response())
}

async fn create_activity(
    State(state): State<AppState>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Response, AppError> {
    let activity = state
        .activities()
        .create_activity(&payload.name, &payload.url)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(activity))).into_response())
}

async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Response, AppError> {
    let activity = state
        .activities()
        .update_activity(id, &payload.name, &payload.url)
        .await?;
    Ok(Json(DataResponse::new(activity)).into_response())
}

async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.activities().delete_activity(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_activity_sessions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (study_sessions, pagination) = state
        .activities()
        .list_activity_sessions(id, query.page(), query.page_size())
        .await?;

    Ok(Json(DataResponse::new(ActivitySessionsData {
        study_sessions,
        pagination,
    }))
    .into_response())
}
