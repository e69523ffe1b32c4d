pub mod badges;
pub mod rest;
pub mod state;

pub use badges::{evaluate_badges_handler, list_badges_handler, owned_badges_handler};
pub use rest::{answers_by_user_handler, score_preview_handler, submit_answer_handler, user_stats_handler};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use quiz_core::ports::PortError;
use state::AppState;
use std::sync::Arc;
use tracing::error;

/// Builds the API router. CORS and Swagger UI are layered on by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/answers/submit", post(submit_answer_handler))
        .route("/answers/user/{user_id}", get(answers_by_user_handler))
        .route("/users/{user_id}/stats", get(user_stats_handler))
        .route("/users/{user_id}/badges", get(owned_badges_handler))
        .route("/users/{user_id}/badges/evaluate", post(evaluate_badges_handler))
        .route("/badges", get(list_badges_handler))
        .route("/scoring/points", get(score_preview_handler))
        .with_state(app_state)
}

/// Maps a port failure onto an HTTP status, logging anything unexpected.
pub(crate) fn port_error_response(context: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        PortError::Unexpected(message) => {
            error!("{}: {}", context, message);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}
