use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::models::User;
use crate::error::{ApiError, ApiJson};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

/// POST /login - Exchange a user handle for a bearer token
///
/// Expected Input:
/// ```json
/// { "user_id": "jdoe" }
/// ```
///
/// The token's subject is the user's id and it carries the user's role.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let handle = payload.user_id.trim();
    if handle.is_empty() {
        return Err(ApiError::field("user_id", "user_id is required"));
    }

    let user = state.users.find_by_handle(handle).await?.ok_or_else(|| {
        tracing::warn!("Login rejected for unknown handle '{}'", handle);
        ApiError::unauthorized("Invalid credentials")
    })?;

    let token = state.tokens.issue(user.id, user.role)?;
    tracing::info!("Issued token for {} ({})", user.id, user.role);

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token,
            expires_in: state.tokens.expiry_seconds(),
            user,
        },
    ))
}
