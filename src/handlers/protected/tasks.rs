use axum::extract::{Path, State};

use crate::database::models::Task;
use crate::error::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::error::parse_id;
use crate::services::task_service::{NewTask, TaskUpdate};
use crate::state::AppState;

/// POST /tasks - Status defaults to `Todo`, priority to `Medium`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewTask>,
) -> ApiResult<Task> {
    let task = state.tasks.create(payload).await?;
    Ok(ApiResponse::created("Task created successfully", task))
}

/// GET /tasks
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    let tasks = state.tasks.list().await?;
    Ok(ApiResponse::success("Tasks retrieved successfully", tasks))
}

/// GET /tasks/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    let task = state.tasks.get(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("Task retrieved successfully", task))
}

/// GET /projects/:id/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Task>> {
    let tasks = state.tasks.list_by_project(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("Tasks retrieved successfully", tasks))
}

/// GET /users/:id/tasks - Tasks assigned to the user
pub async fn list_by_assignee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Task>> {
    let tasks = state.tasks.list_by_assignee(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("Tasks retrieved successfully", tasks))
}

/// GET /tasks/status/:status
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Vec<Task>> {
    let tasks = state.tasks.list_by_status(&status).await?;
    Ok(ApiResponse::success("Tasks retrieved successfully", tasks))
}

/// PUT /tasks/:id - Partial update; `updatedAt` is refreshed
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TaskUpdate>,
) -> ApiResult<Task> {
    let task = state.tasks.update(parse_id("id", &id)?, patch).await?;
    Ok(ApiResponse::success("Task updated successfully", task))
}

/// DELETE /tasks/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.tasks.delete(parse_id("id", &id)?).await?;
    Ok(ApiResponse::message("Task deleted successfully"))
}
