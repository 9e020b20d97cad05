use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pd_store::config::env_var;
use pd_store::paths::{default_data_dir, QUEUE_DB_FILE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub data_dir: PathBuf,
    /// Per-request timeout for the HTTP transport.
    pub request_timeout: Duration,
    /// Retryable responses tolerated before a request is abandoned.
    pub max_attempts: u32,
    /// Replay interval when no sync signal arrives.
    pub resync_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(30),
            max_attempts: 5,
            resync_interval: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `PD_SYNC_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(secs) = env_var::<u64>("PD_SYNC_TIMEOUT_SECS")? {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_var::<u32>("PD_SYNC_MAX_ATTEMPTS")? {
            anyhow::ensure!(n > 0, "PD_SYNC_MAX_ATTEMPTS must be at least 1");
            cfg.max_attempts = n;
        }
        if let Some(secs) = env_var::<u64>("PD_SYNC_INTERVAL_SECS")? {
            anyhow::ensure!(secs > 0, "PD_SYNC_INTERVAL_SECS must be at least 1");
            cfg.resync_interval = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(QUEUE_DB_FILE)
    }
}
