pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route("/generate-job-letter", post(handlers::handle_job_letter))
        .route(
            "/generate-listing-description",
            post(handlers::handle_listing_description),
        )
        .route("/chatbot-reply", post(handlers::handle_chatbot_reply))
        .route("/generate", post(handlers::handle_generate))
        .with_state(state)
}
