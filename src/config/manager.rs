use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Persisted settings.
///
/// Only the resolved adb location is stored; anything else found in the file
/// is ignored on load and dropped on the next save.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(rename = "adbPath", default, skip_serializing_if = "Option::is_none")]
    pub adb_path: Option<PathBuf>,
}

/// Configuration manager for loading and persisting the config file
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new configuration manager backed by the user data directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a configuration manager with a custom config path
    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Self::load_config_from_path(&config_path)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Directory holding the config file and the log file
    pub fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().ok_or_else(|| {
            AppError::ConfigError("Could not determine the user data directory".to_string())
        })?;
        let dir = base.join("droidex");

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                AppError::ConfigError(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(dir)
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.json"))
    }

    fn load_config_from_path(config_path: &Path) -> Result<Config> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(config_path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        if config_content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Persist current config to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| AppError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        fs::write(&self.config_path, json)
            .map_err(|e| AppError::ConfigError(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn adb_path(&self) -> Option<&Path> {
        self.config.adb_path.as_deref()
    }

    /// Remember a discovered adb location. Writes only when it changed.
    pub fn set_adb_path(&mut self, path: &Path) -> Result<bool> {
        if self.config.adb_path.as_deref() == Some(path) {
            return Ok(false);
        }
        self.config.adb_path = Some(path.to_path_buf());
        self.save()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json")).unwrap();
        assert_eq!(manager.adb_path(), None);
    }

    #[test]
    fn test_reads_adb_path_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"adbPath": "/opt/sdk/platform-tools/adb", "theme": "dark"}"#,
        )
        .unwrap();

        let manager = ConfigManager::with_path(&path).unwrap();
        assert_eq!(
            manager.adb_path(),
            Some(Path::new("/opt/sdk/platform-tools/adb"))
        );
    }

    #[test]
    fn test_set_adb_path_persists_and_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut manager = ConfigManager::with_path(&path).unwrap();
        assert!(manager.set_adb_path(Path::new("/usr/bin/adb")).unwrap());
        assert!(!manager.set_adb_path(Path::new("/usr/bin/adb")).unwrap());

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["adbPath"], "/usr/bin/adb");

        let reloaded = ConfigManager::with_path(&path).unwrap();
        assert_eq!(reloaded.adb_path(), Some(Path::new("/usr/bin/adb")));
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let result = ConfigManager::with_path(&path);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
