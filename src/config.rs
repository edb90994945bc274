use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Result, ShelfError, Theme};

/// Classes shipped with the portal, in catalog order
pub const DEFAULT_CLASSES: [&str; 9] = ["isi", "rt", "gl", "tc1", "tc2", "irs", "ds", "da", "cs"];

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted key-value state
    pub data_dir: PathBuf,

    /// Directory holding one `<class>.json` seed dataset per class
    pub datasets_dir: PathBuf,

    /// Directory for backups
    pub backup_dir: PathBuf,

    /// Maximum number of backups to keep (0 keeps all)
    pub max_backups: usize,

    /// Known classes, in the order their datasets are merged
    pub classes: Vec<String>,

    /// Class selected when none has been persisted
    pub default_class: String,

    /// Theme used when none has been persisted
    pub default_theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        let (data_dir, datasets_dir, backup_dir) = match project_dirs() {
            Some(dirs) => (
                dirs.data_dir().join("store"),
                dirs.data_dir().join("datasets"),
                dirs.data_dir().join("backups"),
            ),
            None => (
                PathBuf::from(".edushelf/store"),
                PathBuf::from("data"),
                PathBuf::from(".edushelf/backups"),
            ),
        };

        Self {
            data_dir,
            datasets_dir,
            backup_dir,
            max_backups: 5,
            classes: DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
            default_class: "isi".to_string(),
            default_theme: Theme::Dark,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "edushelf")
}

impl Config {
    /// Location of the config file when `--config` is not given
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        if !path.is_file() {
            return Err(ShelfError::FileNotFound {
                file_path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ShelfError::ConfigError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Uses `path` if given, else the default location if it exists, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| ShelfError::DirectoryError {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.default_class.trim().is_empty() {
            return Err(ShelfError::ConfigError {
                message: "default_class must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
