//! Home directory and installation root resolution for the hub.
//!
//! Two distinct paths matter here and must not be confused:
//!
//! - The *hub's own* config/state home (`get_home_dir`), used for
//!   `~/.config/twister-hub/...`. Overridable via `TWISTER_HUB_HOME` for
//!   testing and custom deployments, falling back to the platform home.
//! - The *installation root*, `TWISTER_PATH`, which names where global
//!   libraries and shared project data live. It has no fallback: its
//!   absence is a fatal start-up error, not a soft default.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Get the home directory used for the hub's own config/state files.
///
/// # Precedence
///
/// 1. `TWISTER_HUB_HOME` environment variable (if set and non-empty)
/// 2. `dirs::home_dir()` platform default
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("TWISTER_HUB_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("could not determine home directory")
}

/// Error resolving the installation root.
#[derive(Debug, Error)]
pub enum TwisterPathError {
    /// `TWISTER_PATH` was unset or empty in the process environment.
    #[error("TWISTER_PATH is not set; it must name the twister installation root")]
    NotSet,
}

/// Resolve the installation root from `TWISTER_PATH`.
///
/// Its absence is a fatal start-up failure for the hub: callers should
/// propagate this error out of `main` rather than substituting a default.
pub fn installation_root() -> Result<PathBuf, TwisterPathError> {
    let raw = std::env::var("TWISTER_PATH").map_err(|_| TwisterPathError::NotSet)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TwisterPathError::NotSet);
    }
    Ok(PathBuf::from(trimmed))
}

/// Whether a user's per-user twister layout exists under their home
/// directory. A user whose `$HOME/twister` is missing cannot log in.
pub fn has_user_twister_home(user_home: &Path) -> bool {
    user_home.join("twister").exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_hub_home_set() {
        let original = env::var("TWISTER_HUB_HOME").ok();
        unsafe { env::set_var("TWISTER_HUB_HOME", "/custom/home") };

        let home = get_home_dir().unwrap();
        assert_eq!(home, PathBuf::from("/custom/home"));

        unsafe {
            match original {
                Some(v) => env::set_var("TWISTER_HUB_HOME", v),
                None => env::remove_var("TWISTER_HUB_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_hub_home_empty_uses_platform_default() {
        let original = env::var("TWISTER_HUB_HOME").ok();
        unsafe { env::set_var("TWISTER_HUB_HOME", "") };

        let home = get_home_dir().unwrap();
        assert_eq!(home, dirs::home_dir().unwrap());

        unsafe {
            match original {
                Some(v) => env::set_var("TWISTER_HUB_HOME", v),
                None => env::remove_var("TWISTER_HUB_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_installation_root_missing_is_fatal() {
        let original = env::var("TWISTER_PATH").ok();
        unsafe { env::remove_var("TWISTER_PATH") };

        let result = installation_root();
        assert!(matches!(result, Err(TwisterPathError::NotSet)));

        unsafe {
            if let Some(v) = original {
                env::set_var("TWISTER_PATH", v);
            }
        }
    }

    #[test]
    #[serial]
    fn test_installation_root_present() {
        let original = env::var("TWISTER_PATH").ok();
        unsafe { env::set_var("TWISTER_PATH", "/opt/twister") };

        let root = installation_root().unwrap();
        assert_eq!(root, PathBuf::from("/opt/twister"));

        unsafe {
            match original {
                Some(v) => env::set_var("TWISTER_PATH", v),
                None => env::remove_var("TWISTER_PATH"),
            }
        }
    }

    #[test]
    fn test_has_user_twister_home() {
        let dir = TempDir::new().unwrap();
        assert!(!has_user_twister_home(dir.path()));

        std::fs::create_dir(dir.path().join("twister")).unwrap();
        assert!(has_user_twister_home(dir.path()));
    }
}
