//! Registration service - validated, hashed, atomic user creation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{CreateUserResponse, DomainError, NewUser, Password, User};

use crate::infra::{TransactionCoordinator, TransactionSource};
use crate::repository::UserRepository;

#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a user. A taken username is `Conflict`.
    async fn register(&self, new_user: NewUser) -> AppResult<CreateUserResponse>;
}

/// Concrete implementation of RegistrationService.
pub struct Registrar<S, R>
where
    S: TransactionSource,
    R: UserRepository<Tx = S::Tx>,
{
    coordinator: TransactionCoordinator<S>,
    repo: Arc<R>,
}

impl<S, R> Registrar<S, R>
where
    S: TransactionSource,
    R: UserRepository<Tx = S::Tx>,
{
    pub fn new(coordinator: TransactionCoordinator<S>, repo: Arc<R>) -> Self {
        Self { coordinator, repo }
    }
}

#[async_trait]
impl<S, R> RegistrationService for Registrar<S, R>
where
    S: TransactionSource,
    R: UserRepository<Tx = S::Tx> + 'static,
{
    async fn register(&self, new_user: NewUser) -> AppResult<CreateUserResponse> {
        new_user.validate().inspect_err(rejected)?;
        let password = Password::new(&new_user.password).inspect_err(rejected)?;

        let user = User::new(
            Uuid::new_v4(),
            new_user.name.trim().to_string(),
            new_user.username,
            new_user.phone,
            password.into_string(),
        );
        let response = CreateUserResponse::from(&user);

        // The write runs on its own task so that dropping the request future
        // cannot leave the transaction without a commit or rollback.
        let coordinator = self.coordinator.clone();
        let repo = Arc::clone(&self.repo);
        let write = tokio::spawn(async move {
            coordinator
                .run(move |tx| async move { repo.create_tx(tx, &user).await }.boxed())
                .await
        });

        match write.await {
            Ok(result) => result?,
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(join_err) => {
                return Err(AppError::internal(format!(
                    "registration task cancelled: {}",
                    join_err
                )))
            }
        }

        tracing::info!(user_id = %response.id, username = %response.username, "user registered");
        Ok(response)
    }
}

fn rejected(err: &DomainError) {
    tracing::debug!(field = err.field().unwrap_or("-"), error = %err, "registration rejected");
}
