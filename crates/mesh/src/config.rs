//! Orchestrator configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Store directory path
    pub store_path: PathBuf,

    /// Remote directory holding interface configuration files
    pub config_dir: String,

    /// DNS server pushed to peer configs, usually the hub address
    pub dns: Option<String>,

    /// Keep-alive interval written into peer configs
    pub keepalive_secs: u16,

    /// Handshakes older than this count as disconnected
    pub handshake_freshness_secs: i64,

    /// Per-command timeout for remote operations
    pub ssh_command_timeout_secs: u64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            store_path: wgmesh_common::default_store_path(),
            config_dir: "/etc/wireguard".to_string(),
            dns: None,
            keepalive_secs: crate::render::DEFAULT_KEEPALIVE_SECS,
            handshake_freshness_secs: crate::status::DEFAULT_FRESHNESS_SECS,
            ssh_command_timeout_secs: crate::remote::DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl MeshConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn db_path(&self) -> PathBuf {
        self.store_path.join("state.db")
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        wgmesh_common::default_store_path().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MeshConfig::default();
        assert_eq!(config.config_dir, "/etc/wireguard");
        assert_eq!(config.keepalive_secs, 25);
        assert_eq!(config.handshake_freshness_secs, 300);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = MeshConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.config_dir, "/etc/wireguard");
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = MeshConfig::default();
        config.dns = Some("10.100.0.1".to_string());
        config.keepalive_secs = 15;
        config.save(&path).unwrap();

        let loaded = MeshConfig::load(&path).unwrap();
        assert_eq!(loaded.dns.as_deref(), Some("10.100.0.1"));
        assert_eq!(loaded.keepalive_secs, 15);
    }
}
