//! Persistent queue table (SQLite via sqlx), separate from the locker
//! database.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use pd_store::db::open_pool;

use crate::{
    error::SyncError,
    models::{NewRequest, QueuedRequest},
};

#[derive(sqlx::FromRow)]
struct QueueRow {
    key: i64,
    url: String,
    method: String,
    body: Option<String>,
    attempts: i64,
    enqueued_at: String,
}

impl TryFrom<QueueRow> for QueuedRequest {
    type Error = SyncError;

    fn try_from(row: QueueRow) -> Result<Self, Self::Error> {
        let body = row
            .body
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let enqueued_at = DateTime::parse_from_rfc3339(&row.enqueued_at)
            .map_err(|e| SyncError::InvalidRequest(format!("bad enqueued_at: {e}")))?
            .with_timezone(&Utc);
        Ok(QueuedRequest {
            key: row.key,
            url: row.url,
            method: row.method,
            body,
            attempts: u32::try_from(row.attempts).unwrap_or(u32::MAX),
            enqueued_at,
        })
    }
}

/// Handle to the queue database.  Cheap to clone.
#[derive(Clone)]
pub struct QueueStore {
    pool: SqlitePool,
}

impl QueueStore {
    pub async fn open(db_path: &Path) -> Result<Self, SyncError> {
        let pool = open_pool(db_path).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| SyncError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Append a request; returns its key.
    pub async fn enqueue(&self, request: &NewRequest) -> Result<i64, SyncError> {
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            "INSERT INTO api_queue (url, method, body, attempts, enqueued_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&request.url)
        .bind(&request.method)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(res.last_insert_rowid())
    }

    /// All queued requests in enqueue order.
    pub async fn pending(&self) -> Result<Vec<QueuedRequest>, SyncError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query_as::<_, QueueRow>(
            "SELECT key, url, method, body, attempts, enqueued_at FROM api_queue ORDER BY key ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        rows.into_iter().map(QueuedRequest::try_from).collect()
    }

    pub async fn remove(&self, key: i64) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM api_queue WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Bump the attempt counter; returns the new count.
    pub async fn record_attempt(&self, key: i64) -> Result<u32, SyncError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE api_queue SET attempts = attempts + 1 WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        let attempts: i64 = sqlx::query_scalar("SELECT attempts FROM api_queue WHERE key = ?")
            .bind(key)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(u32::try_from(attempts).unwrap_or(u32::MAX))
    }

    pub async fn len(&self) -> Result<usize, SyncError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub async fn is_empty(&self) -> Result<bool, SyncError> {
        Ok(self.len().await? == 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn keys_increase_in_enqueue_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::open(&dir.path().join("bg-sync.db")).await.unwrap();

        let a = store
            .enqueue(&NewRequest::new("https://api.test/a", "POST", Some(json!({"n": 1}))))
            .await
            .unwrap();
        let b = store
            .enqueue(&NewRequest::new("https://api.test/b", "PUT", None))
            .await
            .unwrap();
        assert!(b > a);

        let pending = store.pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].key, a);
        assert_eq!(pending[0].body, Some(json!({"n": 1})));
        assert_eq!(pending[1].body, None);
        assert_eq!(pending[1].method, "PUT");
        store.close().await;
    }

    #[tokio::test]
    async fn attempts_and_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::open(&dir.path().join("bg-sync.db")).await.unwrap();
        let key = store
            .enqueue(&NewRequest::new("https://api.test/a", "POST", None))
            .await
            .unwrap();

        assert_eq!(store.record_attempt(key).await.unwrap(), 1);
        assert_eq!(store.record_attempt(key).await.unwrap(), 2);
        assert_eq!(store.pending().await.unwrap()[0].attempts, 2);

        store.remove(key).await.unwrap();
        assert!(store.is_empty().await.unwrap());
        store.close().await;
    }

    #[tokio::test]
    async fn keys_are_not_reused_after_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::open(&dir.path().join("bg-sync.db")).await.unwrap();
        let req = NewRequest::new("https://api.test/a", "POST", None);
        let first = store.enqueue(&req).await.unwrap();
        store.remove(first).await.unwrap();
        let second = store.enqueue(&req).await.unwrap();
        assert!(second > first);
        store.close().await;
    }
}
