use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

/// JWT authentication middleware that validates tokens and injects the caller's `Identity`.
///
/// The token subject must still exist, and the injected role is the stored
/// one, so deleted or re-roled users cannot ride an older token.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    // Validate and decode JWT
    let identity = state.tokens.verify(&token).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let user = state.store.find_user(identity.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "Rejected {} {}: token subject {} no longer exists",
            request.method(),
            request.uri().path(),
            identity.user_id
        );
        ApiError::unauthorized("User not found")
    })?;

    request.extensions_mut().insert(Identity {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
        assert!(extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
    }
}
