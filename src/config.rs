use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDir,
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Where rendered documents are written. `~` is expanded.
    pub output_root: String,
    pub currency: String,
    /// Overridden by `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            output_root: "~/Documents/Opsboard".to_string(),
            currency: "MAD".to_string(),
            log_filter: None,
        }
    }
}

impl AppSettings {
    /// Settings from the platform config dir, or defaults when none were saved yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(AppSettings::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        expand_home_dir(&self.output_root)
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "opsboard", "opsboard").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

pub fn expand_home_dir(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return base_dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
