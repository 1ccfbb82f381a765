//! Application configuration (`config.toml`).

use crate::models::PlayMode;
use crate::settings::GraphicsSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub database_path: PathBuf,
    pub songs_path: PathBuf,
    /// Height reserved at the top of the screen for the toolbar.
    pub toolbar_height: f32,
    /// UI frames per second of the headless loop.
    pub tick_rate: u32,
    pub play_mode: PlayMode,
    pub graphics: GraphicsSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("main.db"),
            songs_path: PathBuf::from("songs"),
            toolbar_height: 40.0,
            tick_rate: 60,
            play_mode: PlayMode::Osu,
            graphics: GraphicsSettings::default(),
        }
    }
}

impl GameConfig {
    /// Reads `path`. Missing keys take their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but any failure yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::info!("CONFIG: {:?} not found, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::error!("CONFIG: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("CONFIG: Saved {:?}", path);
        Ok(())
    }

    /// Frame duration of the headless loop.
    pub fn frame_time(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}
