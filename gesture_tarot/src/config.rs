//! Application configuration.
//!
//! Stored as TOML in the platform config directory (or wherever `--config`
//! points).  A missing default file means defaults; a missing explicit file
//! is an error.  The oracle key from `GEMINI_API_KEY` / `API_KEY` always
//! wins over the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tarot_deck::Locale;
use tarot_oracle::OracleConfig;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("cannot access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub oracle:  OracleConfig,
    pub tracker: TrackerConfig,
    pub display: DisplayConfig,
}

/// External landmark detector.  No command means pointer input only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub command:        Option<String>,
    pub args:           Vec<String>,
    pub min_confidence: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            command:        None,
            args:           Vec::new(),
            min_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: Locale,
    pub width:  usize,
    pub height: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { locale: Locale::Zh, width: 960, height: 720 }
    }
}

/// Smallest window the HUD fits in.
pub const MIN_WINDOW: (usize, usize) = (320, 240);

impl DisplayConfig {
    /// Configured size, raised to [`MIN_WINDOW`].
    pub fn window_size(&self) -> (usize, usize) {
        (self.width.max(MIN_WINDOW.0), self.height.max(MIN_WINDOW.1))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Load / save
// ════════════════════════════════════════════════════════════════════════════

/// `<platform config dir>/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("com", "gesturetarot", "GestureTarot")
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    Ok(toml::from_str(&content)?)
}

pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
}

impl AppConfig {
    /// Load from `explicit`, or from the default location when it exists,
    /// then apply environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let config = match explicit {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                load_config(path)?
            }
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    info!(path = %path.display(), "loading config");
                    load_config(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    AppConfig::default()
                }
            }
        };
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.oracle = self.oracle.with_env_overrides();
        self
    }

    /// The tracker command, if one is configured and non-blank.
    pub fn tracker_command(&self) -> Option<&str> {
        self.tracker.command.as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.display.locale, Locale::Zh);
        assert!((config.tracker.min_confidence - 0.5).abs() < 1e-6);
        assert!(config.tracker_command().is_none());
        assert!((config.oracle.temperature - 0.9).abs() < 1e-6);
        assert_eq!(config.oracle.model, tarot_oracle::DEFAULT_MODEL);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nlocale = \"en\"\n\n[tracker]\ncommand = \"python3\"\nargs = [\"hand_detect.py\"]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.display.locale, Locale::En);
        assert_eq!(config.display.width, 960);
        assert_eq!(config.tracker_command(), Some("python3"));
        assert_eq!(config.tracker.args, vec!["hand_detect.py".to_string()]);
        assert!(config.oracle.api_key.is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.oracle.api_key = Some("abc".into());
        config.display.height = 600;
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = AppConfig::resolve(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[display\nlocale = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn tiny_window_is_raised_to_minimum() {
        let display = DisplayConfig { locale: Locale::En, width: 10, height: 0 };
        assert_eq!(display.window_size(), MIN_WINDOW);
        assert_eq!(DisplayConfig::default().window_size(), (960, 720));
    }

    #[test]
    fn blank_tracker_command_is_none() {
        let mut config = AppConfig::default();
        config.tracker.command = Some("   ".into());
        assert!(config.tracker_command().is_none());
    }
}
