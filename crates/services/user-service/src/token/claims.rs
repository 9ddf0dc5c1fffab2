//! Token claim set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by both access and refresh tokens.
///
/// Serialized as `{exp, nbf, iat, aud, iss, sub}`; `aud` is omitted when no
/// audience is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Copy of these claims with a different expiry.
    pub fn expiring_at(&self, exp: i64) -> Self {
        Self {
            exp,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            iss: "user-service".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
            nbf: Some(1_700_000_000),
            aud: None,
        }
    }

    #[test]
    fn test_expiring_at_leaves_original_untouched() {
        let access = claims();
        let refresh = access.expiring_at(access.exp + 86_400);

        assert_eq!(access.exp, 1_700_086_400);
        assert_eq!(refresh.exp, 1_700_172_800);
        assert_eq!(refresh.sub, access.sub);
        assert_eq!(refresh.iat, access.iat);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(claims()).unwrap();
        let object = json.as_object().unwrap();

        for key in ["sub", "iss", "iat", "exp", "nbf"] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert!(!object.contains_key("aud"));
    }
}
