//! Local Encrypted Store: SQLite via sqlx.
//!
//! The store owns durability, not confidentiality: it persists opaque
//! `{id, iv, blob}` rows produced by the codec.  Every operation runs inside
//! an explicit transaction; a transaction that is not committed rolls back
//! when dropped, so error paths never leave a connection checked out.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};

use pd_crypto::kdf::generate_salt;
use pd_crypto::CryptoError;

use crate::{error::StoreError, models::StoredRecord};

const SALT_META_KEY: &str = "kdf_salt";

/// Open (or create) a SQLite database at `db_path`.
///
/// WAL journal mode is configured at connection time, NOT inside a
/// migration: SQLite forbids changing `journal_mode` inside a transaction and
/// sqlx wraps every migration in one.
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePool::connect_with(opts).await
}

/// Handle to the locker database.  Cheap to clone (Arc internally).
#[derive(Clone)]
pub struct LockerStore {
    pool: SqlitePool,
}

impl LockerStore {
    /// Open the locker database, running pending migrations.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let pool = open_pool(db_path).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::debug!(target: "pd_store", event = "locker_store_opened");
        Ok(Self { pool })
    }

    /// Insert or overwrite the record with the same id.
    pub async fn put(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT OR REPLACE INTO entries (id, iv, blob) VALUES (?, ?, ?)")
            .bind(&record.id)
            .bind(&record.iv)
            .bind(&record.blob)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// All records, in no particular order.
    pub async fn get_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query_as::<_, StoredRecord>("SELECT id, iv, blob FROM entries")
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Delete every record.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query("DELETE FROM entries").execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(
            target: "pd_store",
            event = "locker_cleared",
            removed = res.rows_affected()
        );
        Ok(())
    }

    /// Per-installation KDF salt, generated and persisted on first use.
    ///
    /// The first writer wins: a candidate salt is offered with
    /// `INSERT OR IGNORE` as a single write, then whatever is stored is read
    /// back.  Concurrent first unlocks all agree on one salt and never need a
    /// read-to-write lock upgrade.
    pub async fn installation_salt(&self) -> Result<[u8; 16], StoreError> {
        let candidate = generate_salt();
        let res = sqlx::query("INSERT OR IGNORE INTO locker_meta (key, value) VALUES (?, ?)")
            .bind(SALT_META_KEY)
            .bind(candidate.to_vec())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() > 0 {
            tracing::info!(target: "pd_store", event = "installation_salt_created");
        }

        let stored: Vec<u8> = sqlx::query_scalar("SELECT value FROM locker_meta WHERE key = ?")
            .bind(SALT_META_KEY)
            .fetch_one(&self.pool)
            .await?;
        stored.try_into().map_err(|_| {
            StoreError::Crypto(CryptoError::InvalidKey("stored salt has wrong length".into()))
        })
    }

    /// Release all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
