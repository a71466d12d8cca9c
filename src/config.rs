//! Player settings, read from `settings.toml` in the user's config directory.
//!
//! Every field is optional in the file; missing ones fall back to the defaults below and
//! out-of-range values are clamped on load.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "IcedOverlayPlayer";

pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_FADE_DURATION_MS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_VOLUME: u8 = 80;
pub const DEFAULT_WINDOW_WIDTH: u32 = 960;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 540;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub idle_timeout_ms: u64,
    pub fade_duration_ms: u64,
    pub poll_interval_ms: u64,
    pub default_volume: u8,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_volume: DEFAULT_VOLUME,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl PlayerConfig {
    fn clamped(self) -> Self {
        PlayerConfig {
            idle_timeout_ms: self.idle_timeout_ms.clamp(250, 60_000),
            fade_duration_ms: self.fade_duration_ms.min(5_000),
            poll_interval_ms: self.poll_interval_ms.clamp(16, 2_000),
            default_volume: self.default_volume.min(100),
            window_width: self.window_width.max(320),
            window_height: self.window_height.max(240),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the config from the default location, or defaults when there is none.
pub fn load() -> Result<PlayerConfig, Error> {
    match default_path() {
        Some(path) if path.exists() => load_from_path(&path),
        _ => Ok(PlayerConfig::default()),
    }
}

pub fn load_from_path(path: &Path) -> Result<PlayerConfig, Error> {
    let content = fs::read_to_string(path)?;
    let config: PlayerConfig = toml::from_str(&content)?;
    Ok(config.clamped())
}

pub fn save_to_path(config: &PlayerConfig, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}
