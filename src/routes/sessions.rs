use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::listing::Pagination;
use crate::models::{StudySessionStats, WordWithStats};
use crate::response::DataResponse;
use crate::state::AppState;

use super::ListQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/study_sessions", post(create_session))
        .route("/api/study_sessions/:id", get(get_session))
        .route("/api/study_sessions/:id/review", post(add_review))
        .route("/api/study_sessions/:id/words", get(list_session_words))
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    group_id: i64,
    study_activity_id: i64,
}

#[derive(Debug, Deserialize)]
struct AddReviewRequest {
    word_id: i64,
    #[serde(default)]
    correct: bool,
}

#[derive(Serialize)]
struct SessionDetail {
    id: i64,
    group_id: i64,
    study_activity_id: i64,
    created_at: DateTime<Utc>,
    stats: StudySessionStats,
}

#[derive(Serialize)]
struct SessionWordsData {
    words: Vec<WordWithStats>,
    pagination: Pagination,
}

async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Response, AppError> {
    let session = state
        .sessions()
        .create_session(payload.group_id, payload.study_activity_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))).into_response())
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let session = state.sessions().get_session(id).await?;
    let stats = state.sessions().session_stats(id).await?;

    Ok(Json(DataResponse::new(SessionDetail {
        id: session.id,
        group_id: session.group_id,
        study_activity_id: session.study_activity_id,
        created_at: session.created_at,
        stats,
    }))
    .into_response())
}

async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddReviewRequest>,
) -> Result<Response, AppError> {
    let review = state
        .sessions()
        .add_review(id, payload.word_id, payload.correct)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(review))).into_response())
}

async fn list_session_words(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (words, pagination) = state
        .sessions()
        .list_session_words(id, query.page(), query.page_size())
        .await?;

    Ok(Json(DataResponse::new(SessionWordsData { words, pagination })).into_response())
}
