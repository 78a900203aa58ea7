use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /health - Store connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "description": "Service healthy",
                "data": {
                    "timestamp": now,
                    "version": env!("CARGO_PKG_VERSION"),
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "fail",
                    "description": "database unavailable",
                    "data": {
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
