use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use txl_store::{LogConfig, SyncMode};

use crate::error::{ServerError, ServerResult};

/// Server configuration, loadable from TOML.
///
/// Missing keys fall back to [`ServerConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the `TRANSACTIONS` collection.
    pub data_dir: PathBuf,
    pub sync_mode: SyncMode,
    /// Upper bound on a single storage call before the request fails.
    pub storage_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            data_dir: PathBuf::from(".txl"),
            sync_mode: SyncMode::default(),
            storage_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            sync_mode: self.sync_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.data_dir, PathBuf::from(".txl"));
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
        assert_eq!(c.storage_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            data_dir = "/var/lib/txl"
            sync_mode = "every_write"
            "#,
        )
        .unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/txl"));
        assert_eq!(c.log_config(), LogConfig::durable());
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
        assert_eq!(c.storage_timeout_ms, 5_000);
    }

    #[test]
    fn full_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            data_dir = "data"
            sync_mode = "os_default"
            storage_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.storage_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let error = ServerConfig::from_toml_str("sync_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(error, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("txl.toml");
        std::fs::write(&path, "storage_timeout_ms = 42\n").unwrap();

        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.storage_timeout_ms, 42);

        let missing = ServerConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ServerError::Config(_)));
    }
}
