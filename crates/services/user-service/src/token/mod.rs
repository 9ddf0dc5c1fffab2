//! Token issuance and validation.
//!
//! A single [`TokenConfig`] is built from settings at startup. The issuer and
//! validator derived from it are immutable and shared by every request.

mod claims;
mod issuer;
mod key;
mod validator;

pub use claims::Claims;
pub use issuer::{TokenIssuer, TokenPair};
pub use key::{KeyFamily, SigningAlgorithm, SigningKeyMaterial, VerificationKeyMaterial};
pub use validator::TokenValidator;

use chrono::Duration;

use common::{AppError, AppResult, JwtConfig};

/// Longest lifetime accepted for any token (one year).
const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 3600;

/// Validated token settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: Option<String>,
    pub signing_key: SigningKeyMaterial,
    pub verification_key: VerificationKeyMaterial,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Parse and check raw settings.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown algorithm, unusable key
    /// material, an empty issuer, a non-positive TTL, or a refresh TTL shorter
    /// than the access TTL.
    pub fn from_settings(settings: &JwtConfig) -> AppResult<Self> {
        let algorithm: SigningAlgorithm = settings.algorithm.parse()?;

        let issuer = settings.issuer.trim();
        if issuer.is_empty() {
            return Err(AppError::configuration("token issuer must not be empty"));
        }

        let access_ttl = ttl("access", settings.access_ttl_seconds)?;
        let refresh_ttl = ttl("refresh", settings.refresh_ttl_seconds)?;
        if refresh_ttl < access_ttl {
            return Err(AppError::configuration(
                "refresh token lifetime must not be shorter than access token lifetime",
            ));
        }

        if settings.signing_key.trim().is_empty() {
            return Err(AppError::configuration(
                "JWT_SIGNING_KEY (or JWT_SIGNING_KEY_FILE) must be set",
            ));
        }
        let signing_key = SigningKeyMaterial::new(algorithm, &settings.signing_key)?;
        let verification_raw = match (algorithm.family(), &settings.verification_key) {
            (_, Some(raw)) => raw.as_str(),
            (KeyFamily::Symmetric, None) => settings.signing_key.as_str(),
            (KeyFamily::Asymmetric, None) => {
                return Err(AppError::configuration(format!(
                    "{} requires a public verification key",
                    algorithm
                )))
            }
        };
        let verification_key = VerificationKeyMaterial::new(algorithm, verification_raw)?;

        Ok(Self {
            issuer: issuer.to_string(),
            audience: settings
                .audience
                .as_deref()
                .map(str::trim)
                .filter(|aud| !aud.is_empty())
                .map(str::to_string),
            signing_key,
            verification_key,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.signing_key.algorithm()
    }

    pub fn build_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self)
    }

    pub fn build_validator(&self) -> TokenValidator {
        TokenValidator::new(self)
    }
}

fn ttl(name: &str, seconds: i64) -> AppResult<Duration> {
    if seconds <= 0 || seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(AppError::configuration(format!(
            "{} token lifetime must be between 1 and {} seconds",
            name, MAX_TOKEN_TTL_SECONDS
        )));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| AppError::configuration(format!("{} token lifetime out of range", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");

    fn settings() -> JwtConfig {
        JwtConfig {
            signing_key: SECRET.to_string(),
            ..JwtConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = TokenConfig::from_settings(&settings()).unwrap();
        assert_eq!(config.access_ttl, Duration::hours(24));
        assert_eq!(config.refresh_ttl, Duration::hours(48));
        assert_eq!(config.algorithm(), SigningAlgorithm::HS256);
        assert_eq!(config.audience, None);
    }

    #[test]
    fn test_refresh_shorter_than_access_rejected() {
        let mut raw = settings();
        raw.access_ttl_seconds = 7200;
        raw.refresh_ttl_seconds = 3600;
        assert!(matches!(
            TokenConfig::from_settings(&raw),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut raw = settings();
        raw.access_ttl_seconds = 0;
        assert!(TokenConfig::from_settings(&raw).is_err());

        let mut raw = settings();
        raw.refresh_ttl_seconds = -5;
        assert!(TokenConfig::from_settings(&raw).is_err());
    }

    #[test]
    fn test_empty_issuer_rejected() {
        let mut raw = settings();
        raw.issuer = "  ".to_string();
        assert!(TokenConfig::from_settings(&raw).is_err());
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let mut raw = settings();
        raw.algorithm = "PS256".to_string();
        assert!(matches!(
            TokenConfig::from_settings(&raw),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_rsa_requires_public_key() {
        let raw = JwtConfig {
            algorithm: "RS256".to_string(),
            signing_key: PRIVATE_PEM.to_string(),
            ..JwtConfig::default()
        };
        assert!(TokenConfig::from_settings(&raw).is_err());

        let raw = JwtConfig {
            verification_key: Some(PUBLIC_PEM.to_string()),
            ..raw
        };
        let config = TokenConfig::from_settings(&raw).unwrap();
        assert_eq!(config.signing_key.family(), KeyFamily::Asymmetric);
    }

    #[test]
    fn test_missing_signing_key_rejected() {
        assert!(matches!(
            TokenConfig::from_settings(&JwtConfig::default()),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_blank_audience_is_none() {
        let mut raw = settings();
        raw.audience = Some(" ".to_string());
        assert_eq!(TokenConfig::from_settings(&raw).unwrap().audience, None);
    }
}
