//! pd_crypto — PODrafter Evidence Locker cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Key material is never `Debug`, never `Display`, never serialised.
//!
//! # Module layout
//! - `kdf`   — PBKDF2-HMAC-SHA256 passphrase → 256-bit locker key
//! - `aead`  — AES-256-GCM seal/open with a fresh 96-bit IV per record
//! - `error` — unified error type

pub mod aead;
pub mod error;
pub mod kdf;

pub use error::CryptoError;
