//! Signing algorithms and parsed key material.
//!
//! Keys are parsed once at startup. A bad PEM, a short secret or an unknown
//! algorithm name is a configuration error and never surfaces per request.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use common::{AppError, AppResult};
use domain::MIN_JWT_SECRET_LENGTH;

/// Supported token signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    RS256,
    RS384,
    RS512,
    HS256,
    HS384,
    HS512,
}

/// How a key is used to sign and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    /// Private key signs, public key verifies
    Asymmetric,
    /// One shared secret does both
    Symmetric,
}

impl SigningAlgorithm {
    pub const ALL: [SigningAlgorithm; 6] = [
        SigningAlgorithm::RS256,
        SigningAlgorithm::RS384,
        SigningAlgorithm::RS512,
        SigningAlgorithm::HS256,
        SigningAlgorithm::HS384,
        SigningAlgorithm::HS512,
    ];

    pub fn family(self) -> KeyFamily {
        match self {
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => {
                KeyFamily::Asymmetric
            }
            SigningAlgorithm::HS256 | SigningAlgorithm::HS384 | SigningAlgorithm::HS512 => {
                KeyFamily::Symmetric
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SigningAlgorithm::RS256 => "RS256",
            SigningAlgorithm::RS384 => "RS384",
            SigningAlgorithm::RS512 => "RS512",
            SigningAlgorithm::HS256 => "HS256",
            SigningAlgorithm::HS384 => "HS384",
            SigningAlgorithm::HS512 => "HS512",
        }
    }

    pub(crate) fn jwt_algorithm(self) -> Algorithm {
        match self {
            SigningAlgorithm::RS256 => Algorithm::RS256,
            SigningAlgorithm::RS384 => Algorithm::RS384,
            SigningAlgorithm::RS512 => Algorithm::RS512,
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SigningAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::configuration(format!("unsupported signing algorithm '{}'", s)))
    }
}

fn check_secret(raw: &str) -> AppResult<()> {
    if raw.len() < MIN_JWT_SECRET_LENGTH {
        return Err(AppError::configuration(format!(
            "shared secret must be at least {} bytes",
            MIN_JWT_SECRET_LENGTH
        )));
    }
    Ok(())
}

/// Key used to sign tokens.
#[derive(Clone)]
pub struct SigningKeyMaterial {
    algorithm: SigningAlgorithm,
    key: EncodingKey,
}

impl SigningKeyMaterial {
    /// Parse a private PEM (RS*) or take the raw string as secret bytes (HS*).
    pub fn new(algorithm: SigningAlgorithm, raw: &str) -> AppResult<Self> {
        let key = match algorithm.family() {
            KeyFamily::Asymmetric => EncodingKey::from_rsa_pem(raw.as_bytes()).map_err(|e| {
                AppError::configuration(format!("invalid RSA private key for {}: {}", algorithm, e))
            })?,
            KeyFamily::Symmetric => {
                check_secret(raw)?;
                EncodingKey::from_secret(raw.as_bytes())
            }
        };
        Ok(Self { algorithm, key })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn family(&self) -> KeyFamily {
        self.algorithm.family()
    }

    pub(crate) fn key(&self) -> &EncodingKey {
        &self.key
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Key used to verify token signatures.
#[derive(Clone)]
pub struct VerificationKeyMaterial {
    algorithm: SigningAlgorithm,
    key: DecodingKey,
}

impl VerificationKeyMaterial {
    /// Parse a public PEM (RS*) or take the raw string as secret bytes (HS*).
    pub fn new(algorithm: SigningAlgorithm, raw: &str) -> AppResult<Self> {
        let key = match algorithm.family() {
            KeyFamily::Asymmetric => DecodingKey::from_rsa_pem(raw.as_bytes()).map_err(|e| {
                AppError::configuration(format!("invalid RSA public key for {}: {}", algorithm, e))
            })?,
            KeyFamily::Symmetric => {
                check_secret(raw)?;
                DecodingKey::from_secret(raw.as_bytes())
            }
        };
        Ok(Self { algorithm, key })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub(crate) fn key(&self) -> &DecodingKey {
        &self.key
    }
}

impl fmt::Debug for VerificationKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
