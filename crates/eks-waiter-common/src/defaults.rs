//! Default polling cadence values shared between the library and the CLI
//!
//! These constants keep the two watch kinds consistent across callers.

/// Default one-time grace period after the first cluster observation (seconds).
///
/// Cluster creation and deletion take minutes at minimum, so there is no
/// point re-querying right after the first non-terminal snapshot.
pub const DEFAULT_CLUSTER_INITIAL_WAIT_SECS: u64 = 180;

/// Default interval between cluster status queries (seconds)
pub const DEFAULT_CLUSTER_POLL_INTERVAL_SECS: u64 = 30;

/// Default one-time grace period after the first update observation (seconds)
pub const DEFAULT_UPDATE_INITIAL_WAIT_SECS: u64 = 30;

/// Default interval between update status queries (seconds)
pub const DEFAULT_UPDATE_POLL_INTERVAL_SECS: u64 = 10;
