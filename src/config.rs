use meditrack_core::{AfterWrite, EntityKind, FileStore, Policies, RemoteSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory of the local fallback store
    pub data_dir: ConfigValue<PathBuf>,
    /// Remote table store; both values must be set for remote mode
    pub remote: RemoteSettings,
    /// Entity kinds whose identifiers the remote store assigns
    pub remote_assigned_ids: Vec<EntityKind>,
    /// Per-kind override of how the local mirror follows a remote write
    pub after_write: HashMap<EntityKind, AfterWrite>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    remote: Option<RemoteSettings>,
    remote_assigned_ids: Option<Vec<EntityKind>>,
    after_write: Option<HashMap<EntityKind, AfterWrite>>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self {
            data_dir: ConfigValue::new(Self::default_data_dir(), ConfigSource::Default),
            remote: RemoteSettings::default(),
            remote_assigned_ids: Vec::new(),
            after_write: HashMap::new(),
            config_file: None,
        };

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if !path.exists() {
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError(path.clone(), e))?;
        let file_config: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

        if let Some(data_dir) = file_config.data_dir {
            // Resolve relative paths against config file's directory
            let resolved = if data_dir.is_relative() {
                path.parent().map(|p| p.join(&data_dir)).unwrap_or(data_dir)
            } else {
                data_dir
            };
            config.data_dir = ConfigValue::new(resolved, ConfigSource::File);
        }
        if let Some(remote) = file_config.remote {
            config.remote = remote;
        }
        if let Some(kinds) = file_config.remote_assigned_ids {
            config.remote_assigned_ids = kinds;
        }
        if let Some(after_write) = file_config.after_write {
            config.after_write = after_write;
        }
        config.config_file = Some(path);

        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MEDITRACK_DATA_DIR") {
            self.data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(url) = lookup("MEDITRACK_REMOTE_URL") {
            self.remote.url = Some(url);
        }
        if let Some(key) = lookup("MEDITRACK_REMOTE_KEY") {
            self.remote.api_key = Some(key);
        }
    }

    /// Write policies derived from `remote_assigned_ids` and `after_write`.
    pub fn policies(&self) -> Policies {
        self.after_write.iter().fold(
            Policies::remote_assigned(self.remote_assigned_ids.iter().copied()),
            |policies, (kind, after_write)| policies.with_after_write(*kind, *after_write),
        )
    }

    /// The local fallback store under `data_dir`.
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.data_dir.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/meditrack/
    /// - macOS: ~/Library/Application Support/meditrack/
    /// - Windows: %APPDATA%/meditrack/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meditrack")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/meditrack/
    /// - macOS: ~/Library/Application Support/meditrack/
    /// - Windows: %APPDATA%/meditrack/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meditrack")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrack_core::IdPolicy;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &std::path::Path, lines: &[&str]) -> PathBuf {
        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        config_path
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_file(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("meditrack"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert!(!config.remote.is_configured());
        assert!(config.remote_assigned_ids.is_empty());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(
            temp_dir.path(),
            &[
                "data_dir: /custom/meditrack",
                "remote:",
                "  url: https://example.supabase.co",
                "  api_key: anon-key",
                "remote_assigned_ids: [doctors]",
            ],
        );

        let config = Config::load_file(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/meditrack"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert!(config.remote.is_configured());
        assert_eq!(config.remote_assigned_ids, vec![EntityKind::Doctors]);
        assert_eq!(config.config_file, Some(config_path));

        let policies = config.policies();
        assert_eq!(
            policies.get(EntityKind::Doctors).ids,
            IdPolicy::RemoteAssigned
        );
        assert_eq!(
            policies.get(EntityKind::Patients).ids,
            IdPolicy::ClientGenerated
        );
    }

    #[test]
    fn test_after_write_overrides() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(
            temp_dir.path(),
            &["after_write:", "  doctors: refetch", "  test_reports: patch_cache"],
        );

        let config = Config::load_file(Some(config_path)).unwrap();
        let policies = config.policies();
        assert_eq!(
            policies.get(EntityKind::Doctors).after_write,
            AfterWrite::Refetch
        );
        assert_eq!(
            policies.get(EntityKind::TestReports).after_write,
            AfterWrite::PatchCache
        );
        assert_eq!(
            policies.get(EntityKind::Patients).after_write,
            AfterWrite::Refetch
        );
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(temp_dir.path(), &["data_dir: data"]);

        let config = Config::load_file(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(
            temp_dir.path(),
            &["data_dir: /from/file", "remote:", "  url: https://file.example"],
        );

        let env: HashMap<&str, &str> = [
            ("MEDITRACK_DATA_DIR", "/from/env"),
            ("MEDITRACK_REMOTE_KEY", "env-key"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::load_file(Some(config_path)).unwrap();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);
        assert_eq!(config.remote.url.as_deref(), Some("https://file.example"));
        assert_eq!(config.remote.api_key.as_deref(), Some("env-key"));
        assert!(config.remote.is_configured());
    }

    #[test]
    fn test_half_configured_remote_stays_local() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(temp_dir.path(), &["remote:", "  url: https://x.example"]);

        let config = Config::load_file(Some(config_path)).unwrap();
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn test_unknown_entity_kind_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(temp_dir.path(), &["remote_assigned_ids: [nurses]"]);

        let err = Config::load_file(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = write_config(temp_dir.path(), &["invalid: yaml: content: ["]);

        let result = Config::load_file(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
