//! Token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Validation};

use common::{AppError, AppResult};

use super::{Claims, TokenConfig, VerificationKeyMaterial};

/// Verifies tokens against the configured algorithm, key and issuer.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    key: VerificationKeyMaterial,
    issuer: String,
    audience: Option<String>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &TokenConfig) -> Self {
        // Only the configured algorithm is accepted. Time, issuer and audience
        // checks run in `validate` against the caller's clock.
        let mut validation = Validation::new(config.verification_key.algorithm().jwt_algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: config.verification_key.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            validation,
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// Checks run in order: signature under the configured algorithm, claim
    /// structure, issuer, expiry (`exp > now`), issued-at (`iat <= now`),
    /// not-before, audience. Every failure is `InvalidToken`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, self.key.key(), &self.validation)
            .map_err(|e| AppError::invalid_token(format!("rejected: {}", e)))?
            .claims;

        let now = now.timestamp();

        if claims.iss != self.issuer {
            return Err(AppError::invalid_token("issuer mismatch"));
        }
        if claims.exp <= now {
            return Err(AppError::invalid_token("token expired"));
        }
        if claims.iat > now {
            return Err(AppError::invalid_token("token issued in the future"));
        }
        if claims.nbf.is_some_and(|nbf| nbf > now) {
            return Err(AppError::invalid_token("token not yet valid"));
        }
        if let Some(expected) = &self.audience {
            if claims.aud.as_ref() != Some(expected) {
                return Err(AppError::invalid_token("audience mismatch"));
            }
        }

        Ok(claims)
    }
}
