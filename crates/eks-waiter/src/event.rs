//! Watch events and the error taxonomy
//!
//! These events are the interface between the poll engine and its consumer.
//! The stream closes exactly once, immediately after a terminal event.

use crate::target::DescribeError;
use thiserror::Error;

/// Errors surfaced on the watch stream
#[derive(Debug, Clone, Error)]
pub enum WatchError {
    /// The caller's cancellation signal fired (deadline expiry)
    #[error("watch cancelled")]
    Cancelled,

    /// The caller's stop signal fired (explicit abort)
    #[error("watch stopped")]
    Stopped,

    /// The resource does not exist but was still expected to
    #[error("{resource} no longer exists")]
    Absent {
        resource: String,
        #[source]
        source: DescribeError,
    },

    /// The provider reported a terminal failure status
    #[error("unexpected status {status:?}")]
    FailureStatus { status: String },

    /// The query succeeded but returned no usable payload
    #[error("unexpected empty response")]
    EmptyResponse,

    /// The query itself failed; the watch keeps polling
    #[error(transparent)]
    Describe(#[from] DescribeError),
}

impl WatchError {
    /// Check if this is the cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WatchError::Cancelled)
    }

    /// Check if this is the explicit stop signal
    pub fn is_stopped(&self) -> bool {
        matches!(self, WatchError::Stopped)
    }

    /// Check if this error ends the watch
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WatchError::Cancelled
                | WatchError::Stopped
                | WatchError::Absent { .. }
                | WatchError::FailureStatus { .. }
        )
    }
}

/// One element of the watch stream
#[derive(Debug, Clone)]
pub enum WatchEvent<S> {
    /// A fetched snapshot: progress, or the desired terminal status
    Observed(S),

    /// The provider reported a designated failure status; terminal
    Failed { snapshot: S, error: WatchError },

    /// A query or signal error; ends the stream only when
    /// [`WatchError::is_terminal`] holds for it
    Error(WatchError),

    /// The resource is already gone and absence was the desired outcome;
    /// terminal, carries neither snapshot nor error
    Gone,
}

impl<S> WatchEvent<S> {
    /// The snapshot carried by this event, if any
    pub fn snapshot(&self) -> Option<&S> {
        match self {
            WatchEvent::Observed(snapshot) | WatchEvent::Failed { snapshot, .. } => Some(snapshot),
            WatchEvent::Error(_) | WatchEvent::Gone => None,
        }
    }

    /// The error carried by this event, if any
    pub fn error(&self) -> Option<&WatchError> {
        match self {
            WatchEvent::Failed { error, .. } | WatchEvent::Error(error) => Some(error),
            WatchEvent::Observed(_) | WatchEvent::Gone => None,
        }
    }
}
