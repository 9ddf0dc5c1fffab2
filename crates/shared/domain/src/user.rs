//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_NAME_LENGTH, MAX_USERNAME_LENGTH, MIN_NAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{DomainError, DomainResult};

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{6,20}$").expect("valid phone pattern"));

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user record ready for insertion.
    pub fn new(
        id: Uuid,
        name: String,
        username: String,
        phone: Option<String>,
        password_hash: String,
    ) -> Self {
        Self {
            id,
            name,
            username,
            phone,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Registration input. Holds the plain text password until it is hashed.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub phone: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl NewUser {
    /// Check field-level rules. Password strength is checked by [`crate::Password`].
    pub fn validate(&self) -> DomainResult<()> {
        let name_len = self.name.trim().chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(DomainError::invalid_field(
                "name",
                format!(
                    "Name must be between {} and {} characters",
                    MIN_NAME_LENGTH, MAX_NAME_LENGTH
                ),
            ));
        }

        validate_username(&self.username)?;

        if let Some(phone) = &self.phone {
            if !PHONE_PATTERN.is_match(phone) {
                return Err(DomainError::invalid_field("phone", "Phone number is invalid"));
            }
        }

        Ok(())
    }
}

/// Check username length and character set.
pub fn validate_username(username: &str) -> DomainResult<()> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(DomainError::invalid_field(
            "username",
            format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
            ),
        ));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(DomainError::invalid_field(
            "username",
            "Username may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

/// Public view of a user returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    /// Unique user identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&User> for CreateUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            username: username.to_string(),
            phone: None,
            password: "secret123".to_string(),
        }
    }

    #[test]
    fn test_valid_new_user() {
        assert!(new_user("alice").validate().is_ok());
        assert!(new_user("alice.smith_99").validate().is_ok());
    }

    #[test]
    fn test_username_too_short() {
        assert!(matches!(
            new_user("al").validate(),
            Err(DomainError::InvalidField { field: "username", .. })
        ));
    }

    #[test]
    fn test_username_bad_characters() {
        assert!(new_user("alice smith").validate().is_err());
        assert!(new_user("alice@home").validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut user = new_user("alice");
        user.name = "   ".to_string();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_phone_format() {
        let mut user = new_user("alice");
        user.phone = Some("+6281234567".to_string());
        assert!(user.validate().is_ok());

        user.phone = Some("call me".to_string());
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let debug = format!("{:?}", new_user("alice"));
        assert!(!debug.contains("secret123"));
    }

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User::new(
            Uuid::new_v4(),
            "Alice".to_string(),
            "alice".to_string(),
            None,
            "$argon2id$hash".to_string(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
