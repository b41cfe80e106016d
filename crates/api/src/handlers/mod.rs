//! Request handlers.
//!
//! Handlers delegate to the repositories in `movies_db` and map failures via
//! [`AppError`]. The two fallbacks below answer for requests that match no
//! route or no method.

pub mod movie;

use axum::http::Method;

use crate::error::AppError;

/// Fallback for paths with no matching route.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}
