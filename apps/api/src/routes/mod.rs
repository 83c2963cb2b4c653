pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/gemini/generate-questions",
            post(handlers::handle_generate_questions),
        )
        .route("/api/gemini/score-answer", post(handlers::handle_score_answer))
        .route(
            "/api/gemini/generate-summary",
            post(handlers::handle_generate_summary),
        )
        .with_state(state)
}
