//! Service configuration.
//!
//! Settings are plain serde structs with defaults, overridable through the
//! environment. `PORT` is kept for compatibility with existing deployments;
//! the remaining variables follow the same convention.

use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Settings
// ============================================================================

/// Top-level service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Override for the market-data provider base URL.
    /// Unset means the production eastmoney endpoint.
    #[serde(default)]
    pub provider_base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            provider_base_url: None,
        }
    }
}

impl Settings {
    /// Load settings: defaults overridden by the process environment.
    pub fn load() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(host) = get("HOST") {
            self.host = host;
        }

        if let Some(port) = get("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.port = p,
                Err(_) => warn!(value = %port, "Ignoring unparseable PORT override"),
            }
        }

        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(format) = get("LOG_FORMAT") {
            self.log_format = format;
        }

        if let Some(url) = get("EASTMONEY_BASE_URL") {
            self.provider_base_url = Some(url);
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.log_level, "info");
        assert!(settings.provider_base_url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(|key| match key {
            "PORT" => Some("9000".to_string()),
            "LOG_FORMAT" => Some("json".to_string()),
            "EASTMONEY_BASE_URL" => Some("http://localhost:1234".to_string()),
            _ => None,
        });

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.log_format, "json");
        assert_eq!(
            settings.provider_base_url.as_deref(),
            Some("http://localhost:1234")
        );
        // Untouched fields keep defaults
        assert_eq!(settings.host, "0.0.0.0");
    }

    #[test]
    fn test_unparseable_port_keeps_default() {
        let mut settings = Settings::default();
        settings.apply_env(|key| match key {
            "PORT" => Some("not-a-port".to_string()),
            _ => None,
        });

        assert_eq!(settings.port, 8000);
    }

    #[test]
    fn test_settings_deserialization_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_level, "info");
    }
}
