//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The default pomodoro format and an optional custom one
//! - Notification preferences
//! - The host's maximum reactivation period
//!
//! Configuration is stored at `~/.config/pomoplan/config.toml`. Engine state
//! is never written here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::timer::PomodoroFormat;

const FILE_NAME: &str = "config.toml";

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// `short`, `long` or `custom`.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Work length of the `custom` format; 0 means unset.
    #[serde(default)]
    pub custom_work_minutes: u32,
    /// Break length of the `custom` format; 0 means unset.
    #[serde(default)]
    pub custom_break_minutes: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Ring the terminal bell when an interval completes.
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Upper bound on the time between two ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomoplan/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

fn default_format() -> String {
    "short".into()
}
fn default_true() -> bool {
    true
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            custom_work_minutes: 0,
            custom_break_minutes: 0,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf value".into()).into());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown().into())
    }

    /// Path of the config file inside the default config directory.
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join(FILE_NAME))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. The existing value's type
    /// decides how `value` is parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. On error `self` is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be positive".into(),
            }
            .into());
        }
        if !matches!(
            self.session.default_format.as_str(),
            "short" | "long" | "custom"
        ) {
            return Err(ConfigError::InvalidValue {
                key: "session.default_format".into(),
                message: format!(
                    "'{}' is not one of short, long, custom",
                    self.session.default_format
                ),
            }
            .into());
        }
        Ok(())
    }

    /// The configured custom format, if both lengths are set.
    pub fn custom_format(&self) -> Result<PomodoroFormat, ValidationError> {
        let s = &self.session;
        if s.custom_work_minutes == 0 && s.custom_break_minutes == 0 {
            return Err(ValidationError::CustomFormatUnset);
        }
        PomodoroFormat::new(s.custom_work_minutes, s.custom_break_minutes)
    }

    /// Resolve a format name, falling back to `session.default_format`.
    pub fn resolve_format(&self, name: Option<&str>) -> Result<PomodoroFormat, ValidationError> {
        let name = name.unwrap_or(&self.session.default_format);
        if name.trim().eq_ignore_ascii_case("custom") {
            self.custom_format()
        } else {
            name.parse()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(parsed.notifications.bell);
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[session]\ndefault_format = \"long\"\n").unwrap();
        assert_eq!(parsed.session.default_format, "long");
        assert!(parsed.notifications.bell);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.default_format").as_deref(), Some("short"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("timer.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_typed_values() {
        let mut cfg = Config::default();
        cfg.set("notifications.bell", "false").unwrap();
        cfg.set("session.custom_work_minutes", "40").unwrap();
        cfg.set("session.default_format", "long").unwrap();
        assert!(!cfg.notifications.bell);
        assert_eq!(cfg.session.custom_work_minutes, 40);
        assert_eq!(cfg.session.default_format, "long");
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut cfg = Config::default();
        assert!(cfg.set("notifications.bell", "loud").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "-3").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "0").is_err());
        assert!(cfg.set("session.default_format", "medium").is_err());
        assert!(cfg.set("session", "x").is_err());
        assert!(cfg.set("missing.key", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn resolve_formats() {
        let mut cfg = Config::default();
        assert_eq!(cfg.resolve_format(None), Ok(PomodoroFormat::SHORT));
        assert_eq!(cfg.resolve_format(Some("long")), Ok(PomodoroFormat::LONG));
        assert_eq!(
            cfg.resolve_format(Some("custom")),
            Err(ValidationError::CustomFormatUnset)
        );

        cfg.session.custom_work_minutes = 45;
        cfg.session.custom_break_minutes = 10;
        cfg.session.default_format = "custom".into();
        assert_eq!(cfg.resolve_format(None), Ok(PomodoroFormat::new(45, 10).unwrap()));

        cfg.session.custom_break_minutes = 0;
        assert!(cfg.resolve_format(None).is_err());
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let mut cfg = Config::default();
        cfg.set("timer.tick_interval_ms", "250").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.tick_interval_ms, 250);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, "session = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
