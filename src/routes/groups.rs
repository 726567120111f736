use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::listing::Pagination;
use crate::models::{Group, SessionWithStats, WordWithStats};
use crate::response::DataResponse;
use crate::state::AppState;

use super::ListQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route(
            "/api/groups/:id",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/api/groups/:id/words", get(list_group_words))
        .route(
            "/api/groups/:id/words/:word_id",
            post(add_word).delete(remove_word),
        )
        .route("/api/groups/:id/study_sessions", get(list_group_sessions))
}

#[derive(Debug, Deserialize)]
struct GroupPayload {
    name: String,
}

#[derive(Serialize)]
struct GroupListData {
    groups: Vec<Group>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct GroupWordsData {
    words: Vec<WordWithStats>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct GroupSessionsData {
    study_sessions: Vec<SessionWithStats>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct WordsCountData {
    words_count: i64,
}

async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (groups, pagination) = state
        .groups()
        .list_groups(
            query.page(),
            query.page_size(),
            query.sort_by(),
            query.order(),
        )
        .await?;

    Ok(Json(DataResponse::new(GroupListData { groups, pagination })).into_response())
}

async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let group = state.groups().get_group_with_stats(id).await?;
    Ok(Json(DataResponse::new(group)).into_response())
}

async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<GroupPayload>,
) -> Result<Response, AppError> {
    let group = state.groups().create_group(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(group))).into_response())
}

async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<GroupPayload>,
) -> Result<Response, AppError> {
    let group = state.groups().update_group(id, &payload.name).await?;
    Ok(Json(DataResponse::new(group)).into_response())
}

async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.groups().delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_word(
    State(state): State<AppState>,
    Path((id, word_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let words_count = state.groups().add_word(id, word_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(WordsCountData { words_count })),
    )
        .into_response())
}

async fn remove_word(
    State(state): State<AppState>,
    Path((id, word_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let words_count = state.groups().remove_word(id, word_id).await?;
    Ok(Json(DataResponse::new(WordsCountData { words_count })).into_response())
}

async fn list_group_words(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (words, pagination) = state
        .groups()
        .list_group_words(
            id,
            query.page(),
            query.page_size(),
            query.sort_by(),
            query.order(),
        )
        .await?;

    Ok(Json(DataResponse::new(GroupWordsData { words, pagination })).into_response())
}

async fn list_group_sessions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (study_sessions, pagination) = state
        .groups()
        .list_group_sessions(id, query.page(), query.page_size())
        .await?;

    Ok(Json(DataResponse::new(GroupSessionsData {
        study_sessions,
        pagination,
    }))
    .into_response())
}
