use thiserror::Error;
use uuid::Uuid;

use crate::database::store::StoreError;

/// Errors raised by the entity services and the dashboard assembler
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: Uuid) -> Self {
        ServiceError::NotFound(format!("{} '{}'", entity, id))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => {
                ServiceError::Conflict(format!("A user with this {} already exists", field))
            }
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Parse a path or payload identifier, reporting the offending field
pub fn parse_id(field: &str, raw: &str) -> ServiceResult<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, format!("{} is required", field)));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| ServiceError::validation(field, format!("invalid {}: {}", field, trimmed)))
}

/// Reject empty or whitespace-only required text
pub fn require_text(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
