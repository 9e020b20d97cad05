//! Locker Service: add / list / clear entries for one session.
//!
//! State machine: Locked (no key) → Unlocked via `set_passphrase`; back to
//! Locked via `lock`, auto-lock, or dropping the locker.  `clear_all` is
//! valid in either state.

use chrono::Utc;
use uuid::Uuid;

use pd_crypto::kdf::APP_SALT;

use crate::{
    codec,
    config::{LockerConfig, SaltPolicy},
    db::LockerStore,
    error::StoreError,
    models::{Entry, NewEntry, RecordOutcome, StoredRecord, UndecryptableReason},
    vault::Vault,
};

pub struct Locker {
    store: LockerStore,
    vault: Vault,
    config: LockerConfig,
}

impl Locker {
    /// Open the locker database under `config.data_dir`.  Starts Locked.
    pub async fn open(config: LockerConfig) -> Result<Self, StoreError> {
        let store = LockerStore::open(&config.db_path()).await?;
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: LockerStore, config: LockerConfig) -> Self {
        let vault = Vault::with_auto_lock(config.auto_lock_secs);
        Self {
            store,
            vault,
            config,
        }
    }

    pub fn store(&self) -> &LockerStore {
        &self.store
    }

    /// Derive the session key from `passphrase`, replacing any previous key.
    ///
    /// Entries sealed under a different passphrase stay in the store but
    /// will not appear in listings until that passphrase is set again.
    pub async fn set_passphrase(&self, passphrase: &str) -> Result<(), StoreError> {
        let salt = match self.config.salt_policy {
            SaltPolicy::Application => APP_SALT,
            SaltPolicy::PerInstallation => self.store.installation_salt().await?,
        };
        self.vault
            .unlock(passphrase, &salt, self.config.kdf_iterations)
            .await?;
        tracing::info!(target: "pd_store", event = "locker_unlocked");
        Ok(())
    }

    /// Drop the session key now.
    pub async fn lock(&self) {
        self.vault.lock().await;
        tracing::info!(target: "pd_store", event = "locker_locked");
    }

    pub async fn is_locked(&self) -> bool {
        self.vault.is_locked().await
    }

    /// Seal and persist a new entry.  Fails with `VaultLocked` when locked;
    /// nothing is written in that case.
    pub async fn add_entry(&self, input: NewEntry) -> Result<Entry, StoreError> {
        let entry = input.into_entry(Uuid::new_v4(), Utc::now());
        let sealed = codec::encrypt(&self.vault, &entry).await?;
        self.store
            .put(&StoredRecord {
                id: entry.id.to_string(),
                iv: sealed.iv.to_vec(),
                blob: sealed.blob,
            })
            .await?;
        tracing::info!(target: "pd_store", event = "locker_entry_added", entry_id = %entry.id);
        Ok(entry)
    }

    /// Every stored record, tagged with whether it opened under the current
    /// key.  Unordered.
    pub async fn list_records(&self) -> Result<Vec<RecordOutcome>, StoreError> {
        let records = self.store.get_all().await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let outcome = match codec::decrypt(&self.vault, &record.iv, &record.blob).await {
                Ok(entry) if entry.id.to_string() == record.id => RecordOutcome::Decrypted(entry),
                Ok(_) => undecryptable(record.id, UndecryptableReason::Malformed),
                Err(StoreError::VaultLocked) => {
                    undecryptable(record.id, UndecryptableReason::Locked)
                }
                Err(StoreError::Serialisation(_)) => {
                    undecryptable(record.id, UndecryptableReason::Malformed)
                }
                Err(StoreError::Crypto(_)) => {
                    undecryptable(record.id, UndecryptableReason::Authentication)
                }
                Err(other) => return Err(other),
            };
            out.push(outcome);
        }
        Ok(out)
    }

    /// Entries readable under the current key, newest first.  Records that do
    /// not open are left out.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let outcomes = self.list_records().await?;
        let total = outcomes.len();
        let mut entries: Vec<Entry> = outcomes
            .into_iter()
            .filter_map(RecordOutcome::into_entry)
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skipped = total - entries.len();
        if skipped > 0 {
            tracing::debug!(target: "pd_store", event = "locker_records_skipped", skipped);
        }
        Ok(entries)
    }

    /// Erase every stored record, locked or not.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.store.clear().await
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}

fn undecryptable(id: String, reason: UndecryptableReason) -> RecordOutcome {
    tracing::debug!(target: "pd_store", event = "locker_record_unreadable", record_id = %id, %reason);
    RecordOutcome::Undecryptable { id, reason }
}
