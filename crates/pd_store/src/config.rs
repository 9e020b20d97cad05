use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use pd_crypto::kdf::DEFAULT_ITERATIONS;

use crate::paths::{default_data_dir, LOCKER_DB_FILE};

/// Where the PBKDF2 salt comes from.
///
/// Switching policy changes the derived key, so entries sealed under the
/// other policy become undecryptable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SaltPolicy {
    /// Fixed, application-wide salt. No salt storage needed.
    Application,
    /// Random salt generated once and kept in the locker database.
    PerInstallation,
}

impl FromStr for SaltPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "application" => Ok(SaltPolicy::Application),
            "per-installation" => Ok(SaltPolicy::PerInstallation),
            other => Err(anyhow::anyhow!("unknown salt policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockerConfig {
    pub data_dir: PathBuf,
    pub kdf_iterations: u32,
    pub salt_policy: SaltPolicy,
    /// Inactivity timeout before the key is dropped. 0 = never.
    pub auto_lock_secs: u64,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            kdf_iterations: DEFAULT_ITERATIONS,
            salt_policy: SaltPolicy::Application,
            auto_lock_secs: 0,
        }
    }
}

impl LockerConfig {
    /// Defaults rooted at `dir` instead of the platform data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `PD_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(iterations) = env_var::<u32>("PD_KDF_ITERATIONS")? {
            cfg.kdf_iterations = iterations;
        }
        if let Some(policy) = env_var::<SaltPolicy>("PD_SALT_POLICY")? {
            cfg.salt_policy = policy;
        }
        if let Some(secs) = env_var::<u64>("PD_AUTO_LOCK_SECS")? {
            cfg.auto_lock_secs = secs;
        }
        Ok(cfg)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(LOCKER_DB_FILE)
    }
}

/// Read and parse an optional environment variable.
pub fn env_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {name}")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("cannot read {name}")),
    }
}
