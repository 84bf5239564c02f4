//! Explorer configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_node_url() -> String {
    "http://127.0.0.1:8332".to_string()
}

fn default_start_height() -> u64 {
    // First height the address index is queried from; earlier history
    // predates the index deployment.
    373_601
}

fn default_port() -> u16 {
    3000
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_cache_max_entries() -> usize {
    4096
}

/// Top-level configuration, stored as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Connection settings for the address-indexed node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// JSON-RPC endpoint of the node
    #[serde(default = "default_node_url")]
    pub url: String,
    /// RPC username
    #[serde(default)]
    pub username: String,
    /// RPC password
    #[serde(default)]
    pub password: String,
    /// Lowest height included in address history queries
    #[serde(default = "default_start_height")]
    pub start_height: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: default_node_url(),
            username: String::new(),
            password: String::new(),
            start_height: default_start_height(),
        }
    }
}

/// HTTP listener and background refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the explorer API listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between price and recent-block refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached response stays valid. Zero keeps entries until
    /// they are evicted for space.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Bound on distinct cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        // Set restrictive permissions on config file (contains the RPC password)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms)
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    /// Check if config file exists
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }
}

/// Default config location: `~/.sightline/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .expect("Could not find home directory")
        .join(".sightline")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.node.url, "http://127.0.0.1:8332");
        assert_eq!(config.node.start_height, 373_601);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, 4096);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.node.username = "explorer".to_string();
        config.node.password = "hunter2".to_string();
        config.server.port = 3999;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.node.username, "explorer");
        assert_eq!(loaded.node.password, "hunter2");
        assert_eq!(loaded.server.port, 3999);
        assert_eq!(loaded.node.start_height, 373_601);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[node]\nurl = \"http://node:8332\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.node.url, "http://node:8332");
        assert_eq!(config.node.start_height, 373_601);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(Config::load(&path).is_err());
        assert!(!Config::exists(&path));
    }
}
