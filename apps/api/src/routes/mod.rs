pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::{handle_analyze_resume, MAX_UPLOAD_BYTES};
use crate::chat::handlers as chat;
use crate::state::AppState;
use crate::tools::handlers as tools;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat API
        .route("/api/v1/chat", post(chat::handle_chat))
        .route(
            "/api/v1/chat/:session_id",
            get(chat::handle_get_history).delete(chat::handle_clear_history),
        )
        .route("/api/v1/chat/:session_id/export", get(chat::handle_export))
        // Resume Analyzer API
        .route(
            "/api/v1/resume/analyze",
            post(handle_analyze_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Coaching tools
        .route("/api/v1/tools/skill-gap", post(tools::handle_skill_gap))
        .route("/api/v1/tools/task-plan", post(tools::handle_task_plan))
        .route("/api/v1/tools/web-search", get(tools::handle_web_search))
        .with_state(state)
}
