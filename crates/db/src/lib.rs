//! PostgreSQL access for the movies API: pool setup, row models and
//! repositories.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Upper bound for a single statement, enforced server-side on every pooled
/// connection. Also used as the pool acquire timeout.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    /// Maximum open connections (default: `25`).
    pub max_connections: u32,
    /// Idle connections older than this are closed (default: 15 minutes).
    pub max_idle_time: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 25,
            max_idle_time: Duration::from_secs(15 * 60),
        }
    }
}

fn connect_options(config: &DbConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let timeout_ms = QUERY_TIMEOUT.as_millis().to_string();
    Ok(PgConnectOptions::from_str(&config.url)?
        .options([("statement_timeout", timeout_ms.as_str())]))
}

fn pool_options(config: &DbConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(config.max_idle_time)
        .acquire_timeout(QUERY_TIMEOUT)
}

/// Create a connection pool and open the first connection.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    pool_options(config)
        .connect_with(connect_options(config)?)
        .await
}

/// Create a connection pool that connects on first use.
///
/// Used by tests that exercise request paths which never reach the database.
pub fn create_lazy_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    Ok(pool_options(config).connect_lazy_with(connect_options(config)?))
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// PostgreSQL SQLSTATE raised when `statement_timeout` cancels a query.
pub const QUERY_CANCELED: &str = "57014";

/// `true` if `err` is a statement cancelled by [`QUERY_TIMEOUT`].
pub fn is_query_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(QUERY_CANCELED),
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}
