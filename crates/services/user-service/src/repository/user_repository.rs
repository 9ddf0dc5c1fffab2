//! User repository backed by SeaORM.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, OptionExt};
use domain::User;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unique constraint markers for the username column, as reported by
/// PostgreSQL and SQLite respectively.
const USERNAME_CONSTRAINT_MARKERS: [&str; 2] = ["users_username_key", "users.username"];

/// User repository trait for dependency injection.
///
/// Writes go through a caller-owned transaction. Reads use the pool directly.
#[cfg_attr(any(test, feature = "test-utils"), automock(type Tx = ();))]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Transaction type accepted by [`UserRepository::create_tx`].
    type Tx: Send + Sync;

    /// Insert a user inside `tx`.
    ///
    /// A duplicate username is `Conflict`; any other failure is `Execution`.
    async fn create_tx(&self, tx: &Self::Tx, user: &User) -> AppResult<()>;

    /// Find a user by username. Missing rows are `NotFound`.
    async fn get_by_username(&self, username: &str) -> AppResult<User>;

    /// Find a user by id. Missing rows are `NotFound`.
    async fn get_by_id(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    type Tx = DatabaseTransaction;

    async fn create_tx(&self, tx: &DatabaseTransaction, user: &User) -> AppResult<()> {
        let active_model = ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            username: Set(user.username.clone()),
            phone: Set(user.phone.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at),
        };

        UserEntity::insert(active_model)
            .exec_without_returning(tx)
            .await
            .map_err(map_insert_error)?;

        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(User::from)
            .ok_or_not_found()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::from)
            .ok_or_not_found()
    }
}

/// Map an insert failure, singling out the username uniqueness violation.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if is_username_violation(&detail) => {
            AppError::conflict("Username")
        }
        _ => AppError::Execution(err),
    }
}

fn is_username_violation(detail: &str) -> bool {
    USERNAME_CONSTRAINT_MARKERS
        .iter()
        .any(|marker| detail.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_violation_markers() {
        assert!(is_username_violation(
            "duplicate key value violates unique constraint \"users_username_key\""
        ));
        assert!(is_username_violation("UNIQUE constraint failed: users.username"));
        assert!(!is_username_violation("UNIQUE constraint failed: users.id"));
        assert!(!is_username_violation(
            "duplicate key value violates unique constraint \"users_pkey\""
        ));
    }

    #[test]
    fn test_non_sql_error_is_execution() {
        let err = map_insert_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Execution(_)));
    }
}
