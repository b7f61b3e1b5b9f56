use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::leave::router::error_response;
use crate::workflows::leave::{LeaveServiceError, RosterError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Process-level failure: startup, roster provisioning, serving, or a workflow call made
/// outside a request (CLI commands).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("http server failed: {0}")]
    Server(#[from] axum::Error),
    #[error("leave workflow rejected the operation: {0}")]
    Workflow(#[from] LeaveServiceError),
    #[error("staff roster rejected: {0}")]
    Roster(#[from] RosterError),
}

impl AppError {
    /// Exit status for the CLI, following the sysexits conventions.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 78,
            AppError::Roster(_) => 65,
            AppError::Io(_) => 74,
            AppError::Telemetry(_) | AppError::Server(_) | AppError::Workflow(_) => 1,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Workflow(err) => return error_response(err),
            AppError::Roster(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
