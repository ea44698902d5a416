//! Rosterd Library
//!
//! This library exposes the core modules of rosterd for use in integration tests
//! and as a library for other applications.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export model types
pub use models::{
    District, NewStudent, StudentCode, StudentRecord, StudentUpdate, ValidationError,
    ValidationErrorKind,
};

// Re-export the service layer
pub use service::StudentService;

// Re-export API server functions
pub use api::server::{create_router, create_server, shutdown_signal, AppState};

// Re-export health check types
pub use api::{BuildInfo, ComponentHealth, HealthResponse, HealthStatus, ReadyResponse};
