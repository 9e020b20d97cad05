//! Encrypted Record Codec: Entry <-> `{iv, blob}` under the vault key.

use zeroize::Zeroizing;

use pd_crypto::aead::{self, Sealed};

use crate::{error::StoreError, models::Entry, vault::Vault};

/// Associated data bound into every locker ciphertext.
pub const RECORD_AAD: &[u8] = b"pd-locker-v1";

/// Serialise and seal an entry.  Fails with `VaultLocked` if no key is set.
pub async fn encrypt(vault: &Vault, entry: &Entry) -> Result<Sealed, StoreError> {
    let plaintext = Zeroizing::new(serde_json::to_vec(entry)?);
    vault
        .with_key(|key| aead::seal(key, &plaintext, RECORD_AAD).map_err(StoreError::Crypto))
        .await
}

/// Authenticate, decrypt and parse a sealed entry.
///
/// An authentication failure is routine (another passphrase was active when
/// the record was written) and surfaces as `StoreError::Crypto(AeadDecrypt)`.
pub async fn decrypt(vault: &Vault, iv: &[u8], blob: &[u8]) -> Result<Entry, StoreError> {
    let plaintext = vault
        .with_key(|key| aead::open(key, iv, blob, RECORD_AAD).map_err(StoreError::Crypto))
        .await?;
    Ok(serde_json::from_slice(&plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;
    use chrono::Utc;
    use pd_crypto::kdf::APP_SALT;
    use uuid::Uuid;

    async fn unlocked(passphrase: &str) -> Vault {
        let vault = Vault::new();
        vault.unlock(passphrase, &APP_SALT, 1_000).await.unwrap();
        vault
    }

    fn sample() -> Entry {
        NewEntry::new("bruise photo", "left arm, 3/1")
            .with_date("2024-03-01")
            .into_entry(Uuid::new_v4(), Utc::now())
    }

    #[tokio::test]
    async fn round_trip() {
        let vault = unlocked("correct-horse").await;
        let entry = sample();
        let sealed = encrypt(&vault, &entry).await.unwrap();
        let back = decrypt(&vault, &sealed.iv, &sealed.blob).await.unwrap();
        assert_eq!(back, entry);
    }

    #[tokio::test]
    async fn wrong_passphrase_fails_authentication() {
        let writer = unlocked("correct-horse").await;
        let reader = unlocked("battery-staple").await;
        let sealed = encrypt(&writer, &sample()).await.unwrap();
        let err = decrypt(&reader, &sealed.iv, &sealed.blob).await.unwrap_err();
        assert!(err.is_authentication_failure());
    }

    #[tokio::test]
    async fn locked_vault_is_no_key_error() {
        let vault = Vault::new();
        let err = encrypt(&vault, &sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::VaultLocked));
        let err = decrypt(&vault, &[0u8; 12], &[0u8; 32]).await.unwrap_err();
        assert!(matches!(err, StoreError::VaultLocked));
    }

    #[tokio::test]
    async fn same_entry_twice_gives_distinct_iv_and_blob() {
        let vault = unlocked("correct-horse").await;
        let entry = sample();
        let a = encrypt(&vault, &entry).await.unwrap();
        let b = encrypt(&vault, &entry).await.unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.blob, b.blob);
    }
}
