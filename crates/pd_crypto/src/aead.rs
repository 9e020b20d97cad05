//! Authenticated Encryption with Associated Data
//!
//! Uses AES-256-GCM.
//! Key size: 32 bytes.  IV: 12 bytes (random, fresh per seal).  Tag: 16 bytes.
//!
//! The IV is kept separate from the ciphertext so the store can persist it in
//! its own column:
//!   iv   = 12 random bytes
//!   blob = [ ciphertext | tag (16 bytes) ]

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf::LockerKey;

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Output of a single seal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub blob: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a freshly generated IV.
/// `aad` — additional associated data (authenticated but not encrypted).
pub fn seal(key: &LockerKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.expose()).map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let blob = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::AeadEncrypt)?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&nonce);
    Ok(Sealed { iv, blob })
}

/// Decrypt and authenticate `blob` (ciphertext || tag) under `iv`.
pub fn open(
    key: &LockerKey,
    iv: &[u8],
    blob: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if iv.len() != IV_LEN || blob.len() < TAG_LEN {
        return Err(CryptoError::AeadDecrypt);
    }
    let nonce = Nonce::from_slice(iv);

    let cipher =
        Aes256Gcm::new_from_slice(key.expose()).map_err(|_| CryptoError::AeadDecrypt)?;

    let plaintext = cipher
        .decrypt(nonce, Payload { msg: blob, aad })
        .map_err(|_| CryptoError::AeadDecrypt)?;

    Ok(Zeroizing::new(plaintext))
}
