//! Layered configuration.
//!
//! Built-in defaults, then `config.json` in the platform config directory,
//! then `GLINTLOCK_*` environment variables. Command-line flags are applied
//! last by the binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_URL: &str = "GLINTLOCK_URL";
pub const ENV_DIRECTORY: &str = "GLINTLOCK_DIRECTORY";
pub const ENV_WORLD_ROOT: &str = "GLINTLOCK_WORLD_ROOT";
pub const ENV_API_KEY: &str = "GLINTLOCK_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Where each world document lives, relative to the campaign directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldPaths {
    pub characters_dir: String,
    pub npcs_dir: String,
    pub quests: String,
    pub session_log: String,
    pub dooms: String,
    pub clocks: String,
    pub calendar: String,
    pub gm_notes: String,
}

impl Default for WorldPaths {
    fn default() -> Self {
        Self::under("world")
    }
}

impl WorldPaths {
    /// The standard layout below `root`.
    pub fn under(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            characters_dir: format!("{root}/characters"),
            npcs_dir: format!("{root}/npcs"),
            quests: format!("{root}/quests.md"),
            session_log: format!("{root}/session-log.md"),
            dooms: format!("{root}/dooms.md"),
            clocks: format!("{root}/clocks.md"),
            calendar: format!("{root}/calendar.md"),
            gm_notes: format!("{root}/gm-notes.md"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent server base URL.
    pub server_url: String,
    /// Campaign directory on the agent server.
    pub directory: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Prefix that change events must fall under to trigger a reload.
    pub world_root: String,
    pub paths: WorldPaths,
    pub debounce_ms: u64,
    pub retry_ms: u64,
    /// Limit for one document read or listing against the agent server.
    pub request_timeout_ms: u64,
    /// Address for the read surface.
    pub listen: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:4096".to_string(),
            directory: None,
            api_key: None,
            world_root: "world".to_string(),
            paths: WorldPaths::default(),
            debounce_ms: 500,
            retry_ms: 5000,
            request_timeout_ms: 10_000,
            listen: SocketAddr::from(([127, 0, 0, 1], 17020)),
        }
    }
}

impl Config {
    /// Load the effective configuration. A broken config file is logged and
    /// ignored rather than stopping the process.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Falling back to default configuration: {:#}", e);
                let mut config = Self::default();
                config.apply_env(|key| std::env::var(key).ok());
                config
            }
        }
    }

    pub fn try_load() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        let mut config = Self::from_file(&path)?.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `glintlock/config.json` under the platform config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("", "", "glintlock")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Read a config file. A missing file is `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Apply environment overrides through `lookup`, so tests need not touch
    /// the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.server_url = url;
        }
        if let Some(directory) = lookup(ENV_DIRECTORY).filter(|v| !v.is_empty()) {
            self.directory = Some(directory);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(root) = lookup(ENV_WORLD_ROOT).filter(|v| !v.is_empty()) {
            self.set_world_root(&root);
        }
    }

    /// Move the world root, and the document paths with it when they still
    /// follow the standard layout.
    pub fn set_world_root(&mut self, root: &str) {
        let root = root.trim_end_matches('/').to_string();
        if self.paths == WorldPaths::under(&self.world_root) {
            self.paths = WorldPaths::under(&root);
        }
        self.world_root = root;
    }

    pub fn set_listen_port(&mut self, port: u16) {
        self.listen.set_port(port);
    }

    /// Parse a `host:port` listen address.
    pub fn set_listen(&mut self, value: &str) -> Result<(), ConfigError> {
        self.listen = value.parse().map_err(|_| ConfigError::InvalidValue {
            key: "listen".to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_follow_world_layout() {
        let config = Config::default();
        assert_eq!(config.paths.characters_dir, "world/characters");
        assert_eq!(config.paths.gm_notes, "world/gm-notes.md");
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.retry(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server_url": "http://example:9000", "debounce_ms": 250}"#)
                .unwrap();
        assert_eq!(config.server_url, "http://example:9000");
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.retry_ms, 5000);
        assert_eq!(config.paths, WorldPaths::default());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "http://agent:1234"),
            (ENV_DIRECTORY, "/campaigns/one"),
            (ENV_WORLD_ROOT, "realm/"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server_url, "http://agent:1234");
        assert_eq!(config.directory.as_deref(), Some("/campaigns/one"));
        assert_eq!(config.world_root, "realm");
        assert_eq!(config.paths.quests, "realm/quests.md");
    }

    #[test]
    fn custom_paths_survive_world_root_change() {
        let mut config = Config::default();
        config.paths.quests = "notes/quests.md".to_string();
        config.set_world_root("realm");
        assert_eq!(config.paths.quests, "notes/quests.md");
        assert_eq!(config.world_root, "realm");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("config.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_bad_listen_address() {
        let mut config = Config::default();
        assert!(config.set_listen("nowhere").is_err());
        config.set_listen("0.0.0.0:8080").unwrap();
        assert_eq!(config.listen.port(), 8080);
    }
}
