use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::HotkeySettings;

const APP_DIR: &str = "noteboard";
const APP_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot resolve config directory: HOME is not set")]
    MissingHomeDirectory,
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Application settings persisted in `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub hotkeys: HotkeySettings,
}

/// Location of the config file, resolved once at startup. Without a
/// resolvable config directory the store is in-memory: loads yield defaults
/// and saves report [`ConfigError::MissingHomeDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn from_env() -> Self {
        let (xdg_config_home, home) = config_env_dirs();
        Self::from_dirs(xdg_config_home.as_deref(), home.as_deref())
    }

    fn from_dirs(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Self {
        match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
            Ok(path) => Self::at(path),
            Err(ConfigPathError::MissingHomeDirectory) => {
                tracing::warn!("HOME and XDG_CONFIG_HOME are unset; settings will not be saved");
                Self::in_memory()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the config, never failing: a missing file is written with
    /// defaults, an unreadable or corrupt one is left alone and defaults are
    /// returned.
    pub fn load(&self) -> AppConfig {
        let Some(path) = self.path.as_deref() else {
            return AppConfig::default();
        };
        if !path.exists() {
            let config = AppConfig::default();
            match self.save(&config) {
                Ok(()) => tracing::info!(?path, "wrote default config"),
                Err(err) => tracing::warn!(?err, ?path, "failed to write default config"),
            }
            return config;
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                AppConfig::default()
            }),
            Err(err) => {
                tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
                AppConfig::default()
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> ConfigResult<()> {
        let path = self.path.as_deref().ok_or(ConfigError::MissingHomeDirectory)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(config)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
