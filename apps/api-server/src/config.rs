//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use portal_infra::database::DatabaseConfig;
use portal_infra::JwtConfig;

#[cfg(feature = "rate-limit")]
use portal_infra::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub login_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = parse_or("DB_MAX_CONNECTIONS", config.max_connections);
            config.min_connections = parse_or("DB_MIN_CONNECTIONS", config.min_connections);
            config
        });

        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parse_or("JWT_EXPIRATION_HOURS", defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            jwt,
            #[cfg(feature = "rate-limit")]
            login_rate_limit: login_rate_limit_from_env(),
        }
    }
}

#[cfg(feature = "rate-limit")]
fn login_rate_limit_from_env() -> RateLimitConfig {
    let defaults = RateLimitConfig::default();
    RateLimitConfig {
        max_requests: parse_or("LOGIN_RATE_LIMIT_MAX_REQUESTS", defaults.max_requests),
        window: std::time::Duration::from_secs(parse_or(
            "LOGIN_RATE_LIMIT_WINDOW_SECS",
            defaults.window.as_secs(),
        )),
    }
}

/// Read and parse `key`, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}
