//! Tiered config loading.

use super::merge::merge_tiers;
use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `./taskify/`
    Project = 1,
    /// `~/.taskify/`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfigTier::Defaults => "defaults",
            ConfigTier::Project => "project",
            ConfigTier::User => "user",
            ConfigTier::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// `./taskify` and `~/.taskify`.
    pub fn discover() -> Self {
        Self {
            project_dir: Some(PathBuf::from("taskify")),
            user_dir: dirs::home_dir().map(|home| home.join(".taskify")),
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn tier_file(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            ConfigTier::Defaults | ConfigTier::Environment => None,
        }?;
        Some(dir.join(CONFIG_FILE))
    }
}

/// Loads and merges configuration across tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Files that contributed, lowest tier first.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Merge defaults, project file, user file, then environment overrides.
    ///
    /// `TASKIFY_CONFIG_PATH` replaces both file tiers with a single file.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let explicit = std::env::var("TASKIFY_CONFIG_PATH").ok().map(PathBuf::from);
        let mut config_loader = Self::load_files(paths, explicit)?;
        apply_env_overrides(&mut config_loader.config);
        Ok(config_loader)
    }

    fn load_files(paths: ConfigPaths, explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Config::load(&path)?;
            debug!(path = %path.display(), "Loaded explicit config file");
            return Ok(Self {
                paths,
                config,
                sources: vec![path],
            });
        }

        let mut tiers = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();
        for tier in [ConfigTier::Project, ConfigTier::User] {
            let Some(file) = paths.tier_file(tier) else {
                continue;
            };
            if let Some(value) = read_yaml(&file) {
                debug!(%tier, path = %file.display(), "Merging config tier");
                tiers.push(value);
                sources.push(file);
            }
        }

        let config: Config = serde_json::from_value(merge_tiers(tiers))?;
        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Read a tier file. Missing files are skipped silently, unreadable ones with a warning.
fn read_yaml(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping malformed config file");
            None
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(db_path) = std::env::var("TASKIFY_DB_PATH") {
        config.server.db_path = PathBuf::from(db_path);
    }

    if let Ok(port) = std::env::var("TASKIFY_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid TASKIFY_PORT"),
        }
    }
}
