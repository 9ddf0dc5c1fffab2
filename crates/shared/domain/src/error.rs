//! Errors raised while building domain values.

use thiserror::Error;

/// Why a user or password value could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A user field broke a length or format rule. `reason` is client-safe.
    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Plain text password rejected before hashing.
    #[error("{0}")]
    WeakPassword(String),

    /// Argon2 could not hash, or a stored hash could not be parsed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Field the error refers to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DomainError::InvalidField { field, .. } => Some(field),
            DomainError::WeakPassword(_) => Some("password"),
            DomainError::Hashing(_) => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_is_reported() {
        assert_eq!(
            DomainError::invalid_field("username", "too short").field(),
            Some("username")
        );
        assert_eq!(DomainError::WeakPassword("short".into()).field(), Some("password"));
        assert_eq!(DomainError::Hashing("bad salt".into()).field(), None);
    }
}
