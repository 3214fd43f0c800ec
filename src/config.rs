//! Runtime configuration from environment variables.

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Server settings. Unset variables take the defaults below.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    /// `HOST`, default `0.0.0.0` so the app is reachable from outside a VPS.
    pub host: String,
    /// `PORT`, default 8080.
    pub port: u16,
    /// `BACKEND_URL`, base address of the extraction backend.
    pub backend_url: String,
    /// `BACKEND_TIMEOUT_SECS`, default 120.
    pub backend_timeout: Duration,
    /// `SESSION_IDLE_HOURS`, default 12. Idle sessions are dropped after this long.
    pub session_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_timeout: Duration::from_secs(120),
            session_idle: Duration::from_secs(12 * 3600),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str, default: u64| -> u64 {
            match text(key) {
                None => default,
                Some(v) => v.parse().unwrap_or_else(|_| {
                    log::warn!("{}={:?} is not a number; using {}", key, v, default);
                    default
                }),
            }
        };

        let port = number("PORT", u64::from(defaults.port));
        let port = u16::try_from(port).unwrap_or_else(|_| {
            log::warn!("PORT={} is out of range; using {}", port, defaults.port);
            defaults.port
        });

        Self {
            host: text("HOST").unwrap_or(defaults.host),
            port,
            backend_url: text("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            backend_timeout: Duration::from_secs(number(
                "BACKEND_TIMEOUT_SECS",
                defaults.backend_timeout.as_secs(),
            )),
            session_idle: Duration::from_secs(
                number("SESSION_IDLE_HOURS", defaults.session_idle.as_secs() / 3600) * 3600,
            ),
        }
    }
}
