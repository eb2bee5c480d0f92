use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::judge::executor::ExecutorError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `CONFLICT`, `EMAIL_TAKEN`, `EXECUTION_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Invalid or missing test cases")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    EmailTaken,
    /// The remote execution engine failed or did not finish in time.
    Execution(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        use StatusCode as S;

        let (status, code, message) = match self {
            AppError::Validation(msg) => (S::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::TokenMissing => (
                S::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication required".to_owned(),
            ),
            AppError::TokenInvalid => (
                S::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".to_owned(),
            ),
            AppError::InvalidCredentials => (
                S::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_owned(),
            ),
            AppError::PermissionDenied => (
                S::FORBIDDEN,
                "PERMISSION_DENIED",
                "You are not authorized".to_owned(),
            ),
            AppError::NotFound(msg) => (S::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (S::CONFLICT, "CONFLICT", msg),
            AppError::EmailTaken => (S::CONFLICT, "EMAIL_TAKEN", "User already exists".to_owned()),
            AppError::Execution(msg) => {
                tracing::warn!(%msg, "Execution engine failure");
                (S::BAD_GATEWAY, "EXECUTION_ERROR", msg)
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "Internal error");
                (
                    S::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_owned(),
                )
            }
        };

        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ExecutorError> for AppError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Timeout { attempts } => AppError::Execution(format!(
                "Execution did not finish after {attempts} polling attempts"
            )),
            ExecutorError::Transport(_) | ExecutorError::Status { .. } => {
                AppError::Execution("Execution engine is unavailable".into())
            }
            ExecutorError::Protocol(detail) => AppError::Execution(format!(
                "Execution engine returned an unexpected response: {detail}"
            )),
        }
    }
}
