//! Authentication service - credential checks and token handling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use common::{AppError, AppResult};
use domain::Password;

use crate::repository::UserRepository;
use crate::token::{Claims, TokenIssuer, TokenPair, TokenValidator};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a token pair.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair>;

    /// Verify a token and return its claims.
    fn validate_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator<R: UserRepository> {
    repo: Arc<R>,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl<R: UserRepository> Authenticator<R> {
    pub fn new(repo: Arc<R>, issuer: TokenIssuer, validator: TokenValidator) -> Self {
        Self {
            repo,
            issuer,
            validator,
        }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> AuthService for Authenticator<R> {
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = match self.repo.get_by_username(username).await {
            Ok(user) => user,
            Err(AppError::NotFound) => {
                // Same hashing cost as a real mismatch.
                Password::verify_decoy(password);
                tracing::debug!("login rejected: unknown username");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !Password::from_hash(user.password_hash.clone()).verify(password) {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.issuer.issue_pair(user.id, Utc::now())?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    fn validate_token(&self, token: &str) -> AppResult<Claims> {
        self.validator.validate(token, Utc::now())
    }
}
