//! pd_store — Evidence Locker: encrypted local storage for sensitive notes
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt.  We use application-level encryption:
//! - Every locker entry is serialised to JSON and sealed with AES-256-GCM
//!   under a key derived from the user's passphrase (PBKDF2-HMAC-SHA256).
//! - Each row stores only `{id, iv, blob}`; titles, dates and details exist
//!   in plaintext only inside the running process.
//! - The key lives in a [`Vault`] owned by one [`Locker`] and is zeroized when
//!   the locker is locked or dropped.  It is never persisted or logged.
//!
//! # Threat model
//! Contents never leave the device.  A lost passphrase makes every entry
//! sealed under it permanently unreadable; there is no recovery path.  An
//! attacker holding the unlocked session or the passphrase is out of scope.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on open (schema version 1).

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod locker;
pub mod models;
pub mod paths;
pub mod telemetry;
pub mod vault;

pub use config::{LockerConfig, SaltPolicy};
pub use db::LockerStore;
pub use error::StoreError;
pub use locker::Locker;
pub use models::{Entry, NewEntry, RecordOutcome, StoredRecord, UndecryptableReason};
pub use vault::Vault;
