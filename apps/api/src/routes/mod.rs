pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent;
use crate::analysis::handlers as analysis;
use crate::email::handlers as email;
use crate::state::AppState;

/// Uploads carry two PDFs.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        // Analysis and document generation
        .route(
            "/api/upload-and-analyze",
            post(analysis::handle_upload_and_analyze),
        )
        .route("/api/generate-resume", post(analysis::handle_generate_resume))
        .route(
            "/api/generate-cover-letter",
            post(analysis::handle_generate_cover_letter),
        )
        // Email
        .route("/api/send-email", post(email::handle_send_email))
        // Agent
        .route("/api/agent/run", post(agent::handle_run_agent))
        .route("/api/agent/metrics", get(agent::handle_agent_metrics))
        .route("/api/agent/evaluate", post(agent::handle_evaluate_agent))
        .route("/api/agent/tools", get(agent::handle_list_tools))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
