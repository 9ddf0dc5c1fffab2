//! User service - profile reads.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::AppResult;
use domain::UserProfile;

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Profile of the user with `id`. Missing users are `NotFound`.
    async fn profile(&self, id: Uuid) -> AppResult<UserProfile>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserManager<R> {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> UserService for UserManager<R> {
    async fn profile(&self, id: Uuid) -> AppResult<UserProfile> {
        let user = self.repo.get_by_id(id).await?;
        Ok(UserProfile::from(user))
    }
}
