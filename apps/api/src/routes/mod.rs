pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::state::AppState;
use crate::upload::handlers as upload_handlers;
use crate::upload::validate::MAX_UPLOAD_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Upload API: multipart file in, stored analysis out
        .route("/api/v1/resumes", post(upload_handlers::handle_upload))
        // Analysis API: pre-extracted text in, stored analysis out
        .route(
            "/api/v1/resumes/analyze",
            post(analysis_handlers::handle_analyze),
        )
        .route(
            "/api/v1/analyses/:id",
            get(analysis_handlers::handle_get_analysis),
        )
        // Leave headroom above the 10 MiB document ceiling for multipart framing
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES as usize + 64 * 1024))
        .with_state(state)
}
