pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod logging;
pub mod models;
pub mod repos;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod stats;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

/// Builds the application router against the configured SQLite store,
/// applying pending migrations first.
pub async fn create_app(config: &Config) -> Result<axum::Router, db::InitError> {
    let pool = db::init_pool(config).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool, config.clone());

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
