//! Transaction coordination.
//!
//! [`TransactionCoordinator::run`] executes a unit of work inside one storage
//! transaction. Every path ends in exactly one commit or one rollback:
//!
//! - begin fails: the unit of work never runs, `Execution` is returned
//! - unit of work returns `Err`: rollback, the original error is returned
//! - unit of work panics: rollback, the panic resumes unchanged
//! - unit of work returns `Ok`: commit, a failed commit is `Commit`
//!
//! A failed rollback is logged and never replaces the error that caused it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait,
};

use common::{AppError, AppResult};

/// Future returned by a unit of work borrowing the transaction for `'a`.
pub type TxFuture<'a, T> = BoxFuture<'a, AppResult<T>>;

/// An open storage transaction.
#[async_trait]
pub trait StorageTransaction: Send + Sync + 'static {
    async fn commit(self) -> Result<(), DbErr>;
    async fn rollback(self) -> Result<(), DbErr>;
}

/// Something that can open storage transactions.
#[async_trait]
pub trait TransactionSource: Send + Sync + 'static {
    type Tx: StorageTransaction;

    async fn begin(&self) -> Result<Self::Tx, DbErr>;
}

#[async_trait]
impl StorageTransaction for DatabaseTransaction {
    async fn commit(self) -> Result<(), DbErr> {
        DatabaseTransaction::commit(self).await
    }

    async fn rollback(self) -> Result<(), DbErr> {
        DatabaseTransaction::rollback(self).await
    }
}

#[async_trait]
impl TransactionSource for DatabaseConnection {
    type Tx = DatabaseTransaction;

    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.begin_with_config(
            Some(IsolationLevel::ReadCommitted),
            Some(AccessMode::ReadWrite),
        )
        .await
    }
}

/// Runs units of work atomically.
pub struct TransactionCoordinator<S: TransactionSource> {
    source: Arc<S>,
}

impl<S: TransactionSource> Clone for TransactionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: TransactionSource> TransactionCoordinator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Execute `work` inside a fresh transaction.
    ///
    /// ```ignore
    /// coordinator
    ///     .run(move |tx| async move { repo.create_tx(tx, &user).await }.boxed())
    ///     .await?;
    /// ```
    pub async fn run<F, T>(&self, work: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a S::Tx) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let tx = self.source.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Transaction begin failed");
            AppError::Execution(e)
        })?;

        let outcome = AssertUnwindSafe(async { work(&tx).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!(error = %e, "Transaction commit failed");
                    AppError::Commit(e)
                })?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, cause = %err, "Transaction rollback failed");
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Transaction rollback after panic failed");
                } else {
                    tracing::warn!("Transaction rolled back after panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}
