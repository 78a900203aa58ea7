use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::models::{Role, User};
use crate::database::store::{EntityStore, UserFilter};
use crate::services::error::{require_text, ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
}

/// Partial update. Fields not listed here (id, createdAt) are dropped on
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore>,
    default_role: Role,
}

fn validate_email(email: &str) -> ServiceResult<String> {
    let email = require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ServiceError::validation("email", "email is not a valid address")),
    }
}

fn validate_role(raw: &str) -> ServiceResult<Role> {
    raw.parse::<Role>()
        .map_err(|e| ServiceError::validation("role", e.to_string()))
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore>, default_role: Role) -> Self {
        Self {
            store,
            default_role,
        }
    }

    pub async fn create(&self, input: NewUser) -> ServiceResult<User> {
        let user_id = require_text("user_id", &input.user_id)?;
        let name = require_text("name", &input.name)?;
        let email = validate_email(&input.email)?;
        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => self.default_role,
            Some(raw) => validate_role(raw)?,
        };

        let user = User {
            id: Uuid::new_v4(),
            user_id,
            name,
            email,
            role,
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;

        tracing::info!("Created user {} ({}) with role {}", user.user_id, user.id, user.role);
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn find_by_handle(&self, user_id: &str) -> ServiceResult<Option<User>> {
        let handle = require_text("user_id", user_id)?;
        Ok(self.store.find_user_by_handle(&handle).await?)
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users(UserFilter::All).await?)
    }

    /// Apply a partial update. Changing a role is reserved to super admins.
    pub async fn update(&self, caller: &Identity, id: Uuid, patch: UserUpdate) -> ServiceResult<User> {
        let mut user = self.get(id).await?;

        if let Some(user_id) = patch.user_id {
            user.user_id = require_text("user_id", &user_id)?;
        }
        if let Some(name) = patch.name {
            user.name = require_text("name", &name)?;
        }
        if let Some(email) = patch.email {
            user.email = validate_email(&email)?;
        }
        if let Some(raw) = patch.role {
            let role = validate_role(&raw)?;
            if role != user.role && caller.role != Role::SuperAdmin {
                tracing::warn!("User {} attempted to change role of {}", caller.user_id, id);
                return Err(ServiceError::Forbidden(
                    "only a super admin can change a user's role".to_string(),
                ));
            }
            user.role = role;
        }

        if !self.store.update_user(&user).await? {
            return Err(ServiceError::not_found("user", id));
        }
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_user(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
