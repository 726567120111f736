use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::listing::Pagination;
use crate::models::{WordFields, WordWithStats};
use crate::response::DataResponse;
use crate::state::AppState;

use super::ListQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/words", get(list_words).post(create_word))
        .route(
            "/api/words/:id",
            get(get_word).put(update_word).delete(delete_word),
        )
        .route("/api/words/:id/stats", get(word_stats))
}

#[derive(Serialize)]
struct WordListData {
    words: Vec<WordWithStats>,
    pagination: Pagination,
}

async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (words, pagination) = state
        .words()
        .list_words(
            query.page(),
            query.page_size(),
            query.sort_by(),
            query.order(),
        )
        .await?;

    Ok(Json(DataResponse::new(WordListData { words, pagination })).into_response())
}

async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let word = state.words().get_word(id).await?;
    Ok(Json(DataResponse::new(word)).into_response())
}

async fn create_word(
    State(state): State<AppState>,
    Json(fields): Json<WordFields>,
) -> Result<Response, AppError> {
    let word = state.words().create_word(fields).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(word))).into_response())
}

async fn update_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<WordFields>,
) -> Result<Response, AppError> {
    let word = state.words().update_word(id, fields).await?;
    Ok(Json(DataResponse::new(word)).into_response())
}

async fn delete_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.words().delete_word(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn word_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let stats = state.words().word_stats(id).await?;
    Ok(Json(DataResponse::new(stats)).into_response())
}
