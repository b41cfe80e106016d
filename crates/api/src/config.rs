use std::str::FromStr;
use std::time::Duration;

use movies_db::DbConfig;

/// A configuration variable that is missing or cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment name reported by the health check
    /// (default: `development`).
    pub env: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Connection pool settings.
    pub db: DbConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default       |
    /// |-------------------------|---------------|
    /// | `APP_ENV`               | `development` |
    /// | `HOST`                  | `0.0.0.0`     |
    /// | `PORT`                  | `4000`        |
    /// | `REQUEST_TIMEOUT_SECS`  | `60`          |
    /// | `DATABASE_URL`          | required      |
    /// | `DB_MAX_CONNECTIONS`    | `25`          |
    /// | `DB_MAX_IDLE_TIME_SECS` | `900`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = lookup("APP_ENV").unwrap_or_else(|| "development".into());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 4000)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 60)?;

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut db = DbConfig::new(url);
        db.max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", db.max_connections)?;
        let idle_secs = parse_or(&lookup, "DB_MAX_IDLE_TIME_SECS", db.max_idle_time.as_secs())?;
        db.max_idle_time = Duration::from_secs(idle_secs);

        Ok(Self {
            env,
            host,
            port,
            request_timeout_secs,
            db,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/movies")]).unwrap();

        assert_eq!(config.env, "development");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.db.url, "postgres://localhost/movies");
        assert_eq!(config.db.max_connections, 25);
        assert_eq!(config.db.max_idle_time, Duration::from_secs(900));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/movies"),
            ("APP_ENV", "production"),
            ("PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("DB_MAX_IDLE_TIME_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.env, "production");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db.max_connections, 5);
        assert_eq!(config.db.max_idle_time, Duration::from_secs(60));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_matches!(
            load(&[("DATABASE_URL", "")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = load(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
        assert_eq!(err.to_string(), "PORT has an invalid value: \"eighty\"");
    }
}
