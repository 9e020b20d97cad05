use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Locker is locked — set a passphrase first")]
    VaultLocked,

    #[error("Crypto error: {0}")]
    Crypto(#[from] pd_crypto::CryptoError),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// True when a record failed to authenticate under the active key.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, StoreError::Crypto(e) if e.is_authentication_failure())
    }
}
