pub mod health;
pub mod movie;

use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// ```text
/// /healthcheck      GET
/// /movies           GET, POST
/// /movies/{id}      GET, PUT, DELETE
/// ```
///
/// Any other method on these paths answers 405.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(movie::router())
        .method_not_allowed_fallback(handlers::method_not_allowed)
}
