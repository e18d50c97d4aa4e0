//! Configuration types.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gesture::DEFAULT_ACTIVATION_DISTANCE;
use crate::types::DEFAULT_BOARD_COLOR;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 31995;

/// Root configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub drag: DragConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub boards: BoardsConfig,
}

impl Config {
    /// Load a single config file with no tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Create the database file's parent directory if it is missing.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("taskify/taskify.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Pointer gesture tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Pointer travel in pixels before a press becomes a drag.
    #[serde(default = "default_activation_distance")]
    pub activation_distance_px: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance_px: default_activation_distance(),
        }
    }
}

fn default_activation_distance() -> f64 {
    DEFAULT_ACTIVATION_DISTANCE
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Re-fetch the board after every successful move.
    #[serde(default)]
    pub reconcile_on_success: bool,
}

/// Defaults applied to newly created boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardsConfig {
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Column titles created with every new board, left to right.
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
}

impl Default for BoardsConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_columns: default_columns(),
        }
    }
}

fn default_color() -> String {
    DEFAULT_BOARD_COLOR.to_string()
}

fn default_columns() -> Vec<String> {
    ["To Do", "In Progress", "Review", "Done"]
        .into_iter()
        .map(String::from)
        .collect()
}
