use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that adds the `success` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub description: String,
    pub data: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(description: impl Into<String>, data: T) -> Self {
        Self::with_status(description, data, StatusCode::OK)
    }

    /// Create an API response with custom status code
    pub fn with_status(description: impl Into<String>, data: T, status_code: StatusCode) -> Self {
        Self {
            description: description.into(),
            data: Some(data),
            status_code,
        }
    }

    /// Create a 201 Created response
    pub fn created(description: impl Into<String>, data: T) -> Self {
        Self::with_status(description, data, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// Success without a `data` member
    pub fn message(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            data: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({
            "status": "success",
            "description": self.description,
        });

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => envelope["data"] = value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "status": "fail",
                            "description": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
