//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables (`TWISTER_HUB_*`, `TWISTER_PATH`)
//! 3. Global config (`~/.config/twister-hub/config.toml`)
//! 4. Defaults

mod discovery;
mod types;

pub use discovery::{resolve_config, ConfigError, ConfigOverrides};
pub use types::{Config, CoreConfig, LoggingConfig};
