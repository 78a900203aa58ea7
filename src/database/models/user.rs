use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access role carried by every user and every issued token.
///
/// `Unrecognized` is what an unknown role string decodes to. It is never
/// persisted by the services; the visibility policy treats it as the most
/// restrictive scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "user")]
    Employee,
    Admin,
    SuperAdmin,
    #[serde(other)]
    Unrecognized,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Unrecognized => "unrecognized",
        }
    }

    /// Lenient decoding used for stored rows and token claims.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Role::Unrecognized)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "employee" => Ok(Role::Employee),
            // Legacy default written by early account creation.
            "user" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_and_legacy_alias() {
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn lenient_parse_fails_closed() {
        assert_eq!(Role::parse_lenient("superuser"), Role::Unrecognized);
        assert_eq!(Role::parse_lenient(""), Role::Unrecognized);
    }

    #[test]
    fn serializes_user_with_wire_names() {
        let user = User {
            id: Uuid::nil(),
            user_id: "ada".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::SuperAdmin,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["user_id"], "ada");
        assert_eq!(value["role"], "super_admin");
        assert!(value.get("createdAt").is_some());
    }
}
