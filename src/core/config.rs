//! Configuration management
//!
//! Settings come from `<config dir>/casebook/config.yaml`; every field is
//! optional. The data directory can also be set with `CASEBOOK_HOME` or
//! `--data-dir`, which win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::Prosecutor;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "CASEBOOK_HOME";

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// Persistence backends that can appear in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Json,
}

fn default_backends() -> Vec<BackendKind> {
    vec![BackendKind::Sqlite, BackendKind::Json]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Tried in order; later entries are fallbacks
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendKind>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProsecutorSourceKind {
    /// Per-user list managed with `casebook prosecutor`
    #[default]
    Stored,
    /// Fixed list from `static_prosecutors`
    Static,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub prosecutors: ProsecutorSourceKind,

    #[serde(default)]
    pub static_prosecutors: Vec<Prosecutor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for export files (current directory when unset)
    pub directory: Option<PathBuf>,
}

/// Casebook configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load the user config; unreadable or invalid files fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "loaded config");
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Parse a config file; `Ok(None)` if it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        serde_yml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "casebook")
    }

    /// `<config dir>/casebook/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Resolve the data directory: explicit override, then config, then platform default
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".casebook"))
    }

    /// Directory export files are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(
            config.storage.backends,
            vec![BackendKind::Sqlite, BackendKind::Json]
        );
        assert_eq!(config.reference.prosecutors, ProsecutorSourceKind::Stored);
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(Config::load_from(&tmp.path().join(CONFIG_FILE)).unwrap().is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
storage:
  backends: [json]
reference:
  prosecutors: static
  static_prosecutors:
    - name: Nguyen Thi Lan
      title: Procurator
export:
  directory: /tmp/exports
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap().unwrap();
        assert_eq!(config.storage.backends, vec![BackendKind::Json]);
        assert_eq!(config.reference.prosecutors, ProsecutorSourceKind::Static);
        assert_eq!(config.reference.static_prosecutors[0].name, "Nguyen Thi Lan");
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/exports"));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "storage: [not, a, map]").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_data_dir_precedence() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_data_dir(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("/from/config"));
    }
}
