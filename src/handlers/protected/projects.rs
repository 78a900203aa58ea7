use axum::extract::{Path, State};

use crate::database::models::Project;
use crate::error::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::error::parse_id;
use crate::services::project_service::{NewProject, ProjectUpdate};
use crate::state::AppState;

/// POST /projects
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewProject>,
) -> ApiResult<Project> {
    let project = state.projects.create(payload).await?;
    Ok(ApiResponse::created("Project created successfully", project))
}

/// GET /projects
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = state.projects.list().await?;
    Ok(ApiResponse::success("Projects retrieved successfully", projects))
}

/// GET /projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let project = state.projects.get(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("Project retrieved successfully", project))
}

/// GET /users/:id/projects - Projects the user owns or is a member of
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let projects = state.projects.list_for_user(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("Projects retrieved successfully", projects))
}

/// PUT /projects/:id - Partial update of name, description and members
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProjectUpdate>,
) -> ApiResult<Project> {
    let project = state.projects.update(parse_id("id", &id)?, patch).await?;
    Ok(ApiResponse::success("Project updated successfully", project))
}

/// DELETE /projects/:id - Tasks of the project are kept
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.projects.delete(parse_id("id", &id)?).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}
