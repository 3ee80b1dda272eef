mod config;

pub use config::{Config, NotificationsConfig, SessionConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `$POMOPLAN_CONFIG_DIR` if set, else `~/.config/pomoplan/`.
///
/// # Errors
/// Returns an error if no home directory can be determined or if creating
/// the directory fails.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOPLAN_CONFIG_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config")
            .join("pomoplan"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
