//! Watch configuration

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Input validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// cluster name is empty
    #[error("cluster name cannot be empty")]
    EmptyClusterName,

    /// update id is empty
    #[error("update id cannot be empty")]
    EmptyUpdateId,
}

/// Per-tick side-effect hook, invoked synchronously after each
/// non-terminal snapshot event. Runs on the polling path, so it must not
/// block; the engine ignores whatever it does.
pub type TickFn = Box<dyn Fn() + Send>;

/// Configuration for one watch.
///
/// `initial_wait` is a one-time grace period applied after the first
/// non-terminal snapshot, before the second query; `poll_interval`
/// separates every query after that. The very first query always fires
/// immediately.
pub struct WatchConfig<S> {
    /// Status that ends the watch successfully
    pub desired: S,
    /// Statuses that end the watch as an unrecoverable failure
    pub failure: Vec<S>,
    /// One-time grace period after the first non-terminal snapshot
    pub initial_wait: Duration,
    /// Interval between subsequent queries
    pub poll_interval: Duration,
    pub(crate) cancel: CancellationToken,
    pub(crate) stop: CancellationToken,
    pub(crate) on_tick: Option<TickFn>,
}

impl<S> WatchConfig<S> {
    /// Create a config with no failure statuses, no abort signals, and no
    /// per-tick hook.
    pub fn new(desired: S, initial_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            desired,
            failure: Vec::new(),
            initial_wait,
            poll_interval,
            cancel: CancellationToken::new(),
            stop: CancellationToken::new(),
            on_tick: None,
        }
    }

    /// Statuses that end the watch as an unrecoverable failure
    pub fn failing_on(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.failure = statuses.into_iter().collect();
        self
    }

    /// Token the caller fires to cancel the watch (deadline expiry)
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token the caller fires to stop the watch (explicit abort),
    /// distinguishable from cancellation on the stream
    pub fn with_stop(mut self, token: CancellationToken) -> Self {
        self.stop = token;
        self
    }

    /// Hook invoked after each non-terminal snapshot event
    pub fn on_tick(mut self, hook: impl Fn() + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }
}

impl<S: fmt::Debug> fmt::Debug for WatchConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("desired", &self.desired)
            .field("failure", &self.failure)
            .field("initial_wait", &self.initial_wait)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
