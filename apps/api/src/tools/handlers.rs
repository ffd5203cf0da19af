//! Axum route handlers for the coaching tools.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::reply::TextReply;
use crate::state::AppState;
use crate::tools::coaching::{skill_gap, task_plan};

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskPlanRequest {
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct WebSearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct WebSearchResponse {
    pub query: String,
    pub result: String,
}

/// POST /api/v1/tools/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Json(request): Json<SkillGapRequest>,
) -> Result<Json<TextReply>, AppError> {
    let input = non_empty(&request.input, "input")?;
    Ok(Json(skill_gap(&state.llm, input).await.into()))
}

/// POST /api/v1/tools/task-plan
pub async fn handle_task_plan(
    State(state): State<AppState>,
    Json(request): Json<TaskPlanRequest>,
) -> Result<Json<TextReply>, AppError> {
    let goal = non_empty(&request.goal, "goal")?;
    Ok(Json(task_plan(&state.llm, goal).await.into()))
}

/// GET /api/v1/tools/web-search?q=
pub async fn handle_web_search(
    State(state): State<AppState>,
    Query(params): Query<WebSearchQuery>,
) -> Result<Json<WebSearchResponse>, AppError> {
    let query = non_empty(&params.q, "q")?;
    let result = state.web_search.search(query).await;
    Ok(Json(WebSearchResponse {
        query: query.to_string(),
        result,
    }))
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}
