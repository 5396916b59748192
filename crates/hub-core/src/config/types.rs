//! Configuration types

use serde::{Deserialize, Serialize};

/// Complete hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core configuration
    #[serde(default)]
    pub core: CoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Core hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Address the hub's TCP listener binds to
    pub bind_addr: String,
    /// Deadline for a reverse upcall to an EP or client before it is reported
    /// as `PeerUpcallFailed`
    pub upcall_deadline_ms: u64,
    /// Override for `TWISTER_PATH`; when unset the process environment
    /// variable is authoritative and its absence is a fatal start-up error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twister_path: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:18812".to_string(),
            upcall_deadline_ms: 30_000,
            twister_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.core.bind_addr, "127.0.0.1:18812");
        assert_eq!(config.core.upcall_deadline_ms, 30_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.core.bind_addr, deserialized.core.bind_addr);
        assert_eq!(
            config.core.upcall_deadline_ms,
            deserialized.core.upcall_deadline_ms
        );
    }
}
