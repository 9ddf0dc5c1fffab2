//! Token pair issuance.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Header};
use uuid::Uuid;

use common::{AppError, AppResult};

use super::{Claims, SigningKeyMaterial, TokenConfig};

/// Signed access and refresh tokens for one login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Builds and signs token pairs.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKeyMaterial,
    issuer: String,
    audience: Option<String>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            key: config.signing_key.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Issue an access/refresh pair for `subject` as of `now`.
    ///
    /// The refresh token carries its own claim set; the access claims are
    /// never modified after they are signed.
    pub fn issue_pair(&self, subject: Uuid, now: DateTime<Utc>) -> AppResult<TokenPair> {
        let access_expires_at = expiry(now, self.access_ttl)?;
        let refresh_expires_at = expiry(now, self.refresh_ttl)?;

        let access = Claims {
            sub: subject,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: access_expires_at.timestamp(),
            nbf: Some(now.timestamp()),
            aud: self.audience.clone(),
        };
        let refresh = access.expiring_at(refresh_expires_at.timestamp());

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            access_expires_at,
            refresh_token: self.sign(&refresh)?,
            refresh_expires_at,
        })
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        let header = Header::new(self.key.algorithm().jwt_algorithm());
        encode(&header, claims, self.key.key()).map_err(|e| AppError::signing(e.to_string()))
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> AppResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AppError::signing("token expiry out of range"))
}
