use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::response::DataResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/settings/full_reset", post(full_reset))
        .route("/api/settings/load_seed_data", post(load_seed_data))
}

#[derive(Serialize)]
struct MessageData {
    message: &'static str,
}

#[derive(Serialize)]
struct SeedLoadData {
    statements_executed: u64,
}

async fn full_reset(State(state): State<AppState>) -> Result<Response, AppError> {
    state.sessions().full_reset().await?;
    Ok(Json(DataResponse::new(MessageData {
        message: "full reset complete",
    }))
    .into_response())
}

async fn load_seed_data(State(state): State<AppState>) -> Result<Response, AppError> {
    let statements_executed = state
        .sessions()
        .load_seed_data(&state.config().seeds_dir)
        .await?;
    Ok(Json(DataResponse::new(SeedLoadData {
        statements_executed,
    }))
    .into_response())
}
