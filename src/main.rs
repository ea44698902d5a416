//! Rosterd - A student record management service
//!
//! This application exposes a REST API for registering students, looks after
//! sequential student code allocation, and persists records in PostgreSQL.

use std::sync::Arc;

use rosterd::api::server::{create_server, AppState};
use rosterd::config::Config;
use rosterd::db::student_repo::PgStudentRepository;
use rosterd::db::{create_pool, run_migrations};
use rosterd::error::{Error, Result};
use rosterd::logging;
use rosterd::service::StudentService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Arc::new(Config::from_env()?);

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    logging::init_tracing(&config.server.log_level, &config.server.environment)?;

    // Log configuration (with sensitive data masked)
    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting rosterd");

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool)
        .await
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    let repository = Arc::new(PgStudentRepository::new(pool));
    let service = StudentService::with_code_retry_attempts(
        repository,
        config.registry.code_retry_attempts,
    );

    create_server(config, AppState { service }).await?;

    tracing::info!("rosterd shutdown complete");
    Ok(())
}
