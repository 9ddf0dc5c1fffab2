//! User Service Library
//!
//! Registration, login and profile over HTTP, backed by PostgreSQL.
//! Tokens are signed with one configured algorithm (RS256/384/512 or
//! HS256/384/512) and user writes run inside coordinated transactions.

pub mod config;
pub mod http;
pub mod infra;
pub mod repository;
pub mod service;
pub mod token;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::info;

use common::{AppError, AppResult};

use crate::config::UserServiceConfig;
use crate::http::{create_router, AppState};
use crate::infra::{Database, HealthProbe, TransactionCoordinator, TransactionSource};
use crate::repository::{UserRepository, UserStore};
use crate::service::{Authenticator, Registrar, UserManager};
use crate::token::TokenConfig;

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Wire services over a transaction source and a repository sharing its
/// transaction type.
pub fn build_state<S, R>(
    source: Arc<S>,
    repo: Arc<R>,
    health: Arc<dyn HealthProbe>,
    tokens: &TokenConfig,
) -> AppState
where
    S: TransactionSource,
    R: UserRepository<Tx = S::Tx> + 'static,
{
    let auth_service = Arc::new(Authenticator::new(
        repo.clone(),
        tokens.build_issuer(),
        tokens.build_validator(),
    ));
    let registration_service = Arc::new(Registrar::new(
        TransactionCoordinator::new(source),
        repo.clone(),
    ));
    let user_service = Arc::new(UserManager::new(repo));

    AppState::new(auth_service, registration_service, user_service, health)
}

/// Start the HTTP server and run until a shutdown signal arrives.
pub async fn run_server(host: &str, port: u16, config: UserServiceConfig) -> AppResult<()> {
    let tokens = TokenConfig::from_settings(&config.jwt)?;
    info!(
        algorithm = %tokens.algorithm(),
        issuer = %tokens.issuer,
        "Token configuration loaded"
    );

    let db = Database::connect(&config.database).await?;
    let connection = Arc::new(db.get_connection());
    let repo = Arc::new(UserStore::new(db.get_connection()));

    let state = build_state(connection, repo, Arc::new(db), &tokens)
        .with_secure_cookies(config.secure_cookies);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| AppError::configuration(format!("invalid listen address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("{} listening on {}", config.service.service_name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction, config: &UserServiceConfig) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
