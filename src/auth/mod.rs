use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::Role;

/// Verified caller identity established from a bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, expiry_hours: u64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(TokenError::ExpiryOutOfRange(expiry_hours))?
            .timestamp();

        Ok(Self {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp,
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Token subject is not a valid user id")]
    InvalidSubject,

    #[error("Token expiry of {0} hours is out of range")]
    ExpiryOutOfRange(u64),
}

/// Issues and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_hours: u64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_hours.saturating_mul(3600)
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let claims = Claims::new(user_id, role, self.expiry_hours)?;
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| TokenError::TokenGeneration(e.to_string()))
    }

    /// Validate signature and expiry, then map claims to an identity.
    /// Unknown role strings resolve to `Role::Unrecognized`.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        let user_id =
            Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::InvalidSubject)?;

        Ok(Identity {
            user_id,
            role: Role::parse_lenient(&token_data.claims.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 1)
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, Role::Admin).unwrap();

        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity, Identity { user_id, role: Role::Admin });
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = TokenService::new("other-secret", 1)
            .issue(Uuid::new_v4(), Role::Employee)
            .unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let secret = "test-secret";
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "admin".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn unknown_role_claim_is_unrecognized() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "owner".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token).unwrap().role, Role::Unrecognized);
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        let tokens = TokenService::new("test-secret", u64::MAX);
        assert!(matches!(
            tokens.issue(Uuid::new_v4(), Role::Employee),
            Err(TokenError::ExpiryOutOfRange(u64::MAX))
        ));

        let tokens = TokenService::new("test-secret", i64::MAX as u64);
        assert!(matches!(
            tokens.issue(Uuid::new_v4(), Role::Employee),
            Err(TokenError::ExpiryOutOfRange(_))
        ));
        assert_eq!(tokens.expiry_seconds(), u64::MAX);
    }

    #[test]
    fn empty_secret_refuses_to_issue() {
        let tokens = TokenService::new("", 1);
        assert!(matches!(
            tokens.issue(Uuid::new_v4(), Role::Employee),
            Err(TokenError::InvalidSecret)
        ));
    }
}
