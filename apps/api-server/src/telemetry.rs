//! Log output for the portal server.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info,api_server=debug,portal_infra=debug";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, colored output for local work.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    pub service_name: String,
}

impl TelemetryConfig {
    /// `LOG_FORMAT=json` and `SERVICE_NAME` (default `portal-api`).
    pub fn from_env() -> Self {
        Self {
            format: LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref()),
            service_name: std::env::var("SERVICE_NAME").unwrap_or_else(|_| "portal-api".to_string()),
        }
    }
}

/// Install the global subscriber.
pub fn init_telemetry(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = (config.format == LogFormat::Json).then(|| fmt::layer().json());
    let pretty = (config.format == LogFormat::Pretty).then(|| fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();

    tracing::info!(service = %config.service_name, format = ?config.format, "Logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_defaults_to_pretty() {
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_json_is_case_insensitive() {
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }
}
