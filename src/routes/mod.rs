mod activities;
mod dashboard;
mod groups;
mod health;
mod sessions;
mod settings;
mod words;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::response::ErrorResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .merge(health::router())
        .merge(words::router())
        .merge(groups::router())
        .merge(activities::router())
        .merge(sessions::router())
        .merge(dashboard::router())
        .merge(settings::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    let body = ErrorResponse {
        success: false,
        error: "route not found".to_string(),
        code: "NOT_FOUND",
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Listing query parameters. Numbers are parsed leniently so garbage input
/// falls back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<String>,
    page_size: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

impl ListQuery {
    pub(crate) fn page(&self) -> Option<i64> {
        parse_i64(self.page.as_deref())
    }

    pub(crate) fn page_size(&self) -> Option<i64> {
        parse_i64(self.page_size.as_deref())
    }

    pub(crate) fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub(crate) fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }
}

pub(crate) fn parse_i64(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
}
