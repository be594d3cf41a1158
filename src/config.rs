use std::{
    fmt::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveTime;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// how often the alarms are checked
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 0 to 100
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub sound: Sound,
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_volume() -> f32 {
    100.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            poll_interval_ms: default_poll_interval_ms(),
            volume: default_volume(),
            sound: Sound::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&config)?;
        if !is_valid_time_format(&config.time_format) {
            warn!(
                "invalid time format {:?}, using {:?}",
                config.time_format,
                default_time_format()
            );
            config.time_format = default_time_format();
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, config).map_err(io_error)
    }

    /// never zero, so the poller can't spin
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = project_dirs()?.config_dir().to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    pub fn sounds_path() -> Result<PathBuf, ConfigError> {
        let mut path = project_dirs()?.data_dir().to_path_buf();
        path.push("sounds");
        Ok(path)
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_ok_and(|path| path.exists())
    }
}

/// true if `format` can format a bare time of day, unknown specifiers and
/// date fields (`%Y`, `%d`, ..) both fail when there is no date
#[must_use]
pub fn is_valid_time_format(format: &str) -> bool {
    let mut out = String::new();
    write!(out, "{}", NaiveTime::default().format(format)).is_ok()
}

fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
    directories::ProjectDirs::from("", "", "doseli").ok_or(ConfigError::NoProjectDirs)
}

/// the sound played while an alarm rings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.path.display())
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::alarm()
    }
}

impl Sound {
    #[must_use]
    pub const fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }

    /// `alarm.mp3` in the sounds directory (or the working directory if there is no home)
    #[must_use]
    pub fn alarm() -> Self {
        Self {
            name: "alarm".to_string(),
            path: Config::sounds_path().unwrap_or_default().join("alarm.mp3"),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }
}
