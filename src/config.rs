use crate::error::ConfigError;
use crate::storage::DEFAULT_KEY;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf};

pub const CONFIG_FILE: &str = "todo_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the mirror (one file per key).
    pub storage_dir: PathBuf,
    pub mirror_key: String,
    pub deadline_window_hours: i64,
    /// Periodic re-fetch; `None` disables polling.
    pub refresh_interval_secs: Option<u64>,
    /// Start the mock store with the demo tasks.
    pub seed_fixture: bool,
    pub storage_quota_bytes: Option<usize>,
    /// Defaults to `todo-sync.log` inside `storage_dir`.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".todo-sync"),
            mirror_key: DEFAULT_KEY.to_string(),
            deadline_window_hours: 24,
            refresh_interval_secs: Some(30),
            seed_fixture: true,
            storage_quota_bytes: Some(5 * 1024 * 1024),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the default config unless one exists. Returns whether it wrote.
    pub fn init(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(&Self::default()).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, data).map_err(io_err)?;
        Ok(true)
    }

    pub fn deadline_window(&self) -> Duration {
        Duration::hours(self.deadline_window_hours)
    }

    pub fn refresh_interval(&self) -> Option<std::time::Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.storage_dir.join("todo-sync.log"))
    }
}
