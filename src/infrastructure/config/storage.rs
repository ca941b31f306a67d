use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Something worth reporting about how the configuration was obtained.
///
/// Config is loaded before logging is set up, so the caller reports these
/// once a subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    /// No file existed and a default one was written.
    CreatedDefault(PathBuf),
    /// The file could not be parsed; defaults are in use.
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        error: String,
    },
}

/// A loaded configuration plus anything the caller should report about it.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The effective file configuration.
    pub config: AppConfig,
    /// Set when the file was created or could not be parsed.
    pub notice: Option<ConfigNotice>,
}

pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Create a new `StorageManager`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    /// Creates a new `StorageManager` with a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads the application configuration.
    ///
    /// A missing file is created with defaults. A malformed file is left
    /// untouched and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the default cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let config_path = path_override.map_or_else(
            || self.config_dir.join(CONFIG_FILE_NAME),
            std::path::Path::to_path_buf,
        );

        if !config_path.exists() {
            debug!(path = %config_path.display(), "Writing default config file");
            let default_config = AppConfig::default();
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            Self::save_to_file(&config_path, &default_config)?;
            return Ok(LoadedConfig {
                config: default_config,
                notice: Some(ConfigNotice::CreatedDefault(config_path)),
            });
        }

        let content = fs::read_to_string(&config_path)?;
        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(LoadedConfig {
                config,
                notice: None,
            }),
            Err(e) => Ok(LoadedConfig {
                config: AppConfig::default(),
                notice: Some(ConfigNotice::Malformed {
                    path: config_path,
                    error: e.to_string(),
                }),
            }),
        }
    }

    fn save_to_file<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(data)?;

        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other("Invalid path"))?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_creates_default_if_missing() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::with_dir(dir.path().join("thumbloader"));

        let loaded = manager.load_config(None).unwrap();
        assert!(loaded.config.cache.thumbnail_cache_enabled);

        let config_file = dir.path().join("thumbloader").join(CONFIG_FILE_NAME);
        assert!(config_file.exists());
        assert_eq!(loaded.notice, Some(ConfigNotice::CreatedDefault(config_file)));

        let reloaded = manager.load_config(None).unwrap();
        assert_eq!(reloaded.config.log_level, loaded.config.log_level);
        assert_eq!(reloaded.notice, None);
    }

    #[test]
    fn test_load_config_handles_malformed_file() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::with_dir(dir.path().to_path_buf());
        let config_file = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_file, "invalid_toml = [").unwrap();

        let loaded = manager.load_config(None).unwrap();
        assert!(loaded.config.cache.thumbnail_cache_enabled);
        assert!(matches!(
            loaded.notice,
            Some(ConfigNotice::Malformed { ref path, .. }) if *path == config_file
        ));
        let content = fs::read_to_string(&config_file).unwrap();
        assert_eq!(content, "invalid_toml = [");
    }

    #[test]
    fn test_load_config_from_override_path() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::with_dir(dir.path().to_path_buf());
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "[cache]\nthumbnail_cache_enabled = false\n").unwrap();

        let loaded = manager.load_config(Some(&custom)).unwrap();
        assert!(!loaded.config.cache.thumbnail_cache_enabled);
        assert_eq!(loaded.notice, None);
    }
}
