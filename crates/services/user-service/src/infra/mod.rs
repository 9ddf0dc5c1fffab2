//! Infrastructure layer - database, transactions and health probes.

mod db;
mod health;
pub mod migrations;
mod transaction;

pub use db::Database;
pub use health::HealthProbe;
pub use migrations::Migrator;
pub use transaction::{StorageTransaction, TransactionCoordinator, TransactionSource, TxFuture};
