//! pd_sync — Offline request queue with background replay
//!
//! Mutating API calls are tried directly first.  When the transport fails
//! (no connectivity) the request is persisted to a local SQLite queue and the
//! caller is told it was queued.  A background-sync signal (or the periodic
//! resync tick) replays the queue sequentially, in enqueue order.
//!
//! # Delivery semantics
//! - 2xx: delivered, removed.
//! - 408 / 429 / 5xx, and any 1xx / 3xx: retained with an attempt counter;
//!   the pass stops so later requests never overtake an earlier one.  After
//!   `max_attempts` the request is abandoned and reported.
//! - Any other 4xx: rejected by the server, removed and reported.
//! - Transport failure: retained, no attempt counted, the pass stops.
//!
//! # Idempotence
//! Delivery is at-least-once.  If the server applies a request and the
//! process dies before the row is deleted, the request is sent again on the
//! next replay.  Endpoints receiving replayed calls must tolerate duplicates.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod queue;
pub mod transport;

pub use config::SyncConfig;
pub use db::QueueStore;
pub use error::SyncError;
pub use models::{NewRequest, QueuedRequest, ReplayReport, Submission};
pub use queue::OfflineQueue;
pub use transport::{HttpTransport, Transport};
