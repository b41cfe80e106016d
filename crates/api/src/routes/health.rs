use axum::extract::State;
use axum::{routing::get, Router};
use serde::Serialize;

use crate::response::Pretty;
use crate::state::AppState;

/// Commit the binary was built from, baked in through `BUILD_SHA`.
const BUILT_SHA: &str = match option_env!("BUILD_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

/// `{ "env": ... }`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub env: HealthStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `available` while the process is serving.
    pub status: &'static str,
    pub system_info: SystemInfo,
    pub built_sha: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    /// Deployment environment from `APP_ENV`.
    pub env: String,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /v1/healthcheck -- reports availability and build information.
async fn healthcheck(State(state): State<AppState>) -> Pretty<HealthResponse> {
    Pretty(HealthResponse {
        env: HealthStatus {
            status: "available",
            system_info: SystemInfo {
                env: state.config.env.clone(),
                version: env!("CARGO_PKG_VERSION"),
            },
            built_sha: BUILT_SHA,
        },
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/healthcheck", get(healthcheck))
}
