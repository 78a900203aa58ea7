use axum::extract::State;

use crate::database::models::User;
use crate::error::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::NewUser;
use crate::state::AppState;

/// POST /users - Create a user account
///
/// Expected Input:
/// ```json
/// { "user_id": "jdoe", "name": "Jane Doe", "email": "jane@example.com", "role": "employee" }
/// ```
///
/// `role` is optional and falls back to the configured default.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewUser>,
) -> ApiResult<User> {
    let user = state.users.create(payload).await?;
    Ok(ApiResponse::created("User created successfully", user))
}
