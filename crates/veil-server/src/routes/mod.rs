use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::middleware;
use crate::state::AppState;

pub mod detect;
pub mod health;
pub mod mask;
pub mod process;
pub mod providers;
pub mod ui;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.body_limit();

    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health::health_check))
        .route("/api/detect", post(detect::detect))
        .route("/api/mask", post(mask::mask))
        .route("/api/process", post(process::process))
        .route("/api/providers", get(providers::list_providers))
        .route("/api/bedrock/models", get(providers::list_bedrock_models))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}
