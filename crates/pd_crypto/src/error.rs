use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("AEAD encryption failed")]
    AeadEncrypt,

    #[error("AEAD decryption failed (wrong passphrase, corrupted or tampered record)")]
    AeadDecrypt,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

impl CryptoError {
    /// True when the ciphertext failed to authenticate under the active key.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, CryptoError::AeadDecrypt)
    }
}
