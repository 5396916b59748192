//! Configuration discovery and resolution

use super::types::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override the TCP bind address
    pub bind_addr: Option<String>,
    /// Override the reverse-upcall deadline, in milliseconds
    pub upcall_deadline_ms: Option<u64>,
    /// Override the `TWISTER_PATH` installation root
    pub twister_path: Option<String>,
    /// Override the logging level
    pub log_level: Option<String>,
    /// Path to config file override
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (`TWISTER_HUB_*`)
/// 3. Global config (`~/.config/twister-hub/config.toml`, or the CLI-supplied path)
/// 4. Defaults
pub fn resolve_config(overrides: &ConfigOverrides, home_dir: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    let config_path = overrides
        .config_path
        .clone()
        .unwrap_or_else(|| home_dir.join(".config/twister-hub/config.toml"));

    if config_path.exists() {
        match load_config_file(&config_path) {
            Ok(file_config) => merge_config(&mut config, file_config),
            Err(e) => eprintln!("warning: failed to parse config at {config_path:?}: {e}"),
        }
    }

    apply_env_overrides(&mut config);
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

fn merge_config(base: &mut Config, file: Config) {
    base.core.bind_addr = file.core.bind_addr;
    base.core.upcall_deadline_ms = file.core.upcall_deadline_ms;
    if file.core.twister_path.is_some() {
        base.core.twister_path = file.core.twister_path;
    }
    base.logging.level = file.logging.level;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(addr) = std::env::var("TWISTER_HUB_BIND_ADDR") {
        config.core.bind_addr = addr;
    }

    if let Ok(ms) = std::env::var("TWISTER_HUB_UPCALL_DEADLINE_MS")
        && let Ok(parsed) = ms.parse()
    {
        config.core.upcall_deadline_ms = parsed;
    }

    if let Ok(path) = std::env::var("TWISTER_PATH") {
        config.core.twister_path = Some(path);
    }

    if let Ok(level) = std::env::var("TWISTER_HUB_LOG") {
        config.logging.level = level;
    }
}

fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(ref addr) = overrides.bind_addr {
        config.core.bind_addr = addr.clone();
    }

    if let Some(ms) = overrides.upcall_deadline_ms {
        config.core.upcall_deadline_ms = ms;
    }

    if let Some(ref path) = overrides.twister_path {
        config.core.twister_path = Some(path.clone());
    }

    if let Some(ref level) = overrides.log_level {
        config.logging.level = level.clone();
    }
}
