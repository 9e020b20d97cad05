//! Vault: the in-memory locker key for one unlocked session.
//!
//! The vault holds the 32-byte key derived from the passphrase.  Locking the
//! vault (explicitly, after the idle timeout, or by dropping the last handle)
//! drops the key, which zeroizes it.  There is no way to read the key back out.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use pd_crypto::kdf::{locker_key_from_passphrase, LockerKey};
use pd_crypto::CryptoError;

use crate::error::StoreError;

struct Session {
    key: LockerKey,
    last_used: Instant,
}

/// Session key holder.  Clones share the same session.
#[derive(Clone)]
pub struct Vault {
    session: Arc<RwLock<Option<Session>>>,
    /// Idle time after which the session is dropped. `None` = never.
    idle_timeout: Option<Duration>,
}

impl Vault {
    pub fn new() -> Self {
        Self::with_auto_lock(0)
    }

    /// `auto_lock_secs` of 0 disables the idle timeout.
    pub fn with_auto_lock(auto_lock_secs: u64) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            idle_timeout: (auto_lock_secs > 0).then(|| Duration::from_secs(auto_lock_secs)),
        }
    }

    /// Derive a key from `passphrase` + `salt` and make it the active key,
    /// replacing any previous one.
    ///
    /// PBKDF2 runs on the blocking pool; the caller is suspended meanwhile.
    pub async fn unlock(
        &self,
        passphrase: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<(), StoreError> {
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let salt = salt.to_vec();
        let key = tokio::task::spawn_blocking(move || {
            locker_key_from_passphrase(&passphrase, &salt, iterations)
        })
        .await
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))??;

        *self.session.write().await = Some(Session {
            key,
            last_used: Instant::now(),
        });
        Ok(())
    }

    /// Drop the session key.
    pub async fn lock(&self) {
        *self.session.write().await = None;
    }

    pub async fn is_locked(&self) -> bool {
        let mut slot = self.session.write().await;
        self.drop_if_idle(&mut slot);
        slot.is_none()
    }

    /// Run `f` with the session key.  Counts as activity for the idle timer.
    pub async fn with_key<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&LockerKey) -> Result<R, StoreError>,
    {
        let mut slot = self.session.write().await;
        self.drop_if_idle(&mut slot);
        let session = slot.as_mut().ok_or(StoreError::VaultLocked)?;
        session.last_used = Instant::now();
        f(&session.key)
    }

    fn drop_if_idle(&self, slot: &mut Option<Session>) {
        let idle = match (self.idle_timeout, slot.as_ref()) {
            (Some(timeout), Some(session)) => session.last_used.elapsed() > timeout,
            _ => false,
        };
        if idle {
            *slot = None;
            tracing::info!(target: "pd_store", event = "vault_auto_locked");
        }
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}
