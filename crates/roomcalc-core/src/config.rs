use crate::{RoomError, RoomResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Number of worker threads draining the task queue.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Maximum number of pending tasks. `0` means unbounded.
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// How long `shutdown` waits for in-flight work before abandoning workers.
    #[serde(default)]
    pub shutdown_grace_ms: Option<u64>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/roomcalc/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("roomcalc/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("roomcalc\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::load_from(&config_path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> RoomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> RoomResult<Self> {
        toml::from_str(content).map_err(|e| RoomError::Config(e.to_string()))
    }

    /// Worker count, never less than one.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS).max(1)
    }

    /// `None` when the queue is unbounded.
    pub fn effective_queue_capacity(&self) -> Option<usize> {
        match self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY) {
            0 => None,
            n => Some(n),
        }
    }

    pub fn effective_shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms.unwrap_or(DEFAULT_SHUTDOWN_GRACE_MS))
    }
}
