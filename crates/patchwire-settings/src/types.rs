//! Settings type definitions with compiled defaults.

use serde::{Deserialize, Serialize};

/// Where to find the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Server hostname or address.
    pub host: String,
    /// Server port (serves both the duplex connection and the product endpoint).
    pub port: u16,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level settings for the patchwire client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchwireSettings {
    /// Server connection settings.
    pub connection: ConnectionSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let settings = PatchwireSettings::default();
        assert_eq!(settings.connection.host, "127.0.0.1");
        assert_eq!(settings.connection.port, 8080);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_json_fills_remaining_defaults() {
        let settings: PatchwireSettings =
            serde_json::from_str(r#"{"connection": {"port": 9090}}"#).unwrap();
        assert_eq!(settings.connection.port, 9090);
        assert_eq!(settings.connection.host, "127.0.0.1");
        assert_eq!(settings.logging.level, "info");
    }
}
