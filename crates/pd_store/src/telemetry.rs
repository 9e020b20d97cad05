//! Structured logging bootstrap for hosts embedding the locker.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "pd_store=info,pd_sync=info";

/// Install a global `fmt` subscriber honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .try_init();
}
