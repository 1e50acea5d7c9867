use std::str::FromStr;

use axum::http::HeaderValue;

/// Raised when an environment variable holds a value that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite connection string.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                    |
    /// |------------------------|--------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                  |
    /// | `PORT`                 | `3000`                                     |
    /// | `DATABASE_URL`         | `sqlite://construction_stages.db?mode=rwc` |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", "3000", "u16")?;
        let database_url = env_or("DATABASE_URL", "sqlite://construction_stages.db?mode=rwc");
        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", "http://localhost:5173"))?;
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", "30", "u64")?;

        Ok(Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.into())
}

fn parse_env<T: FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env_or(var, default);
    value.parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}

/// Split a comma-separated origin list, skipping blanks.
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            origin.parse().map_err(|_| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                expected: "origin",
                value: origin.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_list() {
        let origins = parse_origins("http://a.test, ,http://b.test").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn rejects_invalid_origin() {
        let err = parse_origins("http://ok.test,bad\norigin").unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));
    }
}
