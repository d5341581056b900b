use serde::{Deserialize, Serialize};

/// Flush/sync strategy for the file-backed log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    EveryWrite,
    /// Flush to the OS and rely on page-cache write-back.
    #[default]
    OsDefault,
}

/// Configuration for a [`FileRecordLog`](crate::FileRecordLog).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl LogConfig {
    /// Configuration that fsyncs every append.
    pub fn durable() -> Self {
        Self {
            sync_mode: SyncMode::EveryWrite,
        }
    }
}
