//! Key derivation
//!
//! `locker_key_from_passphrase` — PBKDF2-HMAC-SHA256, derives the 32-byte key
//!   used to seal Evidence Locker records.
//!
//! The default salt is fixed and application-wide. This is an accepted risk:
//! it removes the need to store a salt, at the price of letting an attacker
//! precompute a dictionary against this one application. Deployments that
//! want a per-installation salt pass one in explicitly (see `generate_salt`).

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// Fixed application salt: ASCII `PODrafter-locker`.
pub const APP_SALT: [u8; 16] = *b"PODrafter-locker";

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 150_000;

pub const KEY_LEN: usize = 32;

/// 32-byte locker key derived from a passphrase. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct LockerKey(pub(crate) [u8; KEY_LEN]);

impl LockerKey {
    /// Raw bytes, for the AEAD calls in this crate only.
    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Derive a locker key from a passphrase + salt.
pub fn locker_key_from_passphrase(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<LockerKey, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be non-zero".into(),
        ));
    }
    if salt.is_empty() {
        return Err(CryptoError::KeyDerivation("salt must not be empty".into()));
    }
    let mut output = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, &mut output);
    Ok(LockerKey(output))
}

/// Generate a fresh random 16-byte salt (per-installation salt policy).
pub fn generate_salt() -> [u8; 16] {
    let mut salt = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
