use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use movies_core::error::CoreError;

use crate::json::JsonBodyError;
use crate::response::{ErrorResponse, Pretty};

/// Client-facing text for every 500 response.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Client-facing text for every 404 response.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

/// Client-facing text for a request that ran past the server's deadline.
pub const REQUEST_TIMEOUT_MESSAGE: &str = "the server timed out processing your request";

/// Client-facing text for a lost optimistic-concurrency race.
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] so every failure leaves as an `{"error": ...}`
/// envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `movies_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body could not be decoded.
    #[error(transparent)]
    Json(#[from] JsonBodyError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route or resource matches the request.
    #[error("Not found")]
    NotFound,

    /// The route exists but does not accept this method.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// The request did not finish within the configured deadline.
    #[error("Request timed out")]
    RequestTimeout,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => not_found(),
                CoreError::Validation(errors) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, ErrorResponse::fields(errors))
                }
                CoreError::Conflict(detail) => {
                    tracing::debug!(detail = %detail, "Edit conflict");
                    (
                        StatusCode::CONFLICT,
                        ErrorResponse::message(EDIT_CONFLICT_MESSAGE),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    server_error()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Request body errors ---
            AppError::Json(err) if err.is_internal() => {
                tracing::error!(error = %err, "Failed to read request body");
                server_error()
            }
            AppError::Json(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::message(err.to_string()),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::NotFound => not_found(),
            AppError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::message(format!(
                    "the {method} method is not supported for this resource"
                )),
            ),
            AppError::RequestTimeout => {
                tracing::warn!("Request timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    ErrorResponse::message(REQUEST_TIMEOUT_MESSAGE),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                server_error()
            }
        };

        (status, Pretty(body)).into_response()
    }
}

fn not_found() -> (StatusCode, ErrorResponse) {
    (StatusCode::NOT_FOUND, ErrorResponse::message(NOT_FOUND_MESSAGE))
}

fn server_error() -> (StatusCode, ErrorResponse) {
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::server_error())
}

/// Classify a sqlx error into an HTTP status and body.
///
/// - `RowNotFound` maps to 404.
/// - A cancelled statement or an exhausted pool is logged as a query timeout.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, ErrorResponse) {
    match err {
        sqlx::Error::RowNotFound => not_found(),
        err if movies_db::is_query_timeout(err) => {
            tracing::error!(error = %err, timeout = ?movies_db::QUERY_TIMEOUT, "Query timed out");
            server_error()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            server_error()
        }
    }
}
