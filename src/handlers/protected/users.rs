use axum::extract::{Extension, Path, State};

use crate::auth::Identity;
use crate::database::models::User;
use crate::error::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::error::parse_id;
use crate::services::user_service::UserUpdate;
use crate::state::AppState;

/// GET /users - List every user
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.users.list().await?;
    Ok(ApiResponse::success("Users retrieved successfully", users))
}

/// GET /users/:id - Show one user
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state.users.get(parse_id("id", &id)?).await?;
    Ok(ApiResponse::success("User retrieved successfully", user))
}

/// PUT /users/:id - Partial update; changing `role` requires super_admin
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    let user = state.users.update(&identity, parse_id("id", &id)?, patch).await?;
    Ok(ApiResponse::success("User updated successfully", user))
}

/// DELETE /users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.users.delete(parse_id("id", &id)?).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
