//! Health check endpoints for rosterd
//!
//! This module implements health and readiness checks for Kubernetes
//! and other orchestration platforms.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;

use crate::api::{
    get_build_info, server::AppState, ComponentHealth, HealthResponse, HealthStatus, ReadyResponse,
};

/// Basic liveness check endpoint
///
/// Returns 200 OK if the service is alive.
/// This endpoint should be lightweight and not check external dependencies.
///
/// # Example
/// ```
/// GET /healthz
/// ```
pub async fn health_check() -> Response {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Service is running".to_string()),
        timestamp: Utc::now(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Readiness check endpoint
///
/// Checks if the service is ready to accept traffic by verifying
/// the backing store is reachable.
///
/// # Example
/// ```
/// GET /readyz
/// ```
pub async fn ready_check(State(state): State<AppState>) -> Response {
    let database = match state.service.health().await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Database connection pool is healthy".to_string()),
            last_check: Utc::now(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Database unreachable".to_string()),
                last_check: Utc::now(),
            }
        }
    };

    let overall_status = database.status;
    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database);

    let response = ReadyResponse {
        status: overall_status,
        checks,
        timestamp: Utc::now(),
    };

    (overall_status.to_status_code(), Json(response)).into_response()
}

/// Build information endpoint
///
/// Returns build metadata including version, commit hash, and build time.
///
/// # Example
/// ```
/// GET /build
/// ```
pub async fn build_info() -> Response {
    (StatusCode::OK, Json(get_build_info())).into_response()
}
