//! Watch strategy trait and the status-query error type
//!
//! The poll engine is generic over [`WatchTarget`]; the cluster and update
//! watches are its two implementations. An implementation supplies the
//! query, how to read a status out of a snapshot, and what "does not exist"
//! looks like for its resource kind.

use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Error returned by a status query.
///
/// Carries the provider's structured error code when the client library
/// exposed one, and the error message, falling back to the rendered error
/// when it did not. Classification consumes exactly this pair.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DescribeError {
    /// Structured provider error code, e.g. `ResourceNotFoundException`
    pub code: Option<String>,
    /// Message from the provider, or the rendered client error
    pub message: String,
}

impl DescribeError {
    /// Error with a structured code
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Error with no structured code (free-text only)
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// One watched resource kind.
pub trait WatchTarget: Send + Sync + 'static {
    /// One fetched observation of the resource
    type Snapshot: fmt::Debug + Clone + Send + 'static;

    /// The status vocabulary for this resource kind
    type Status: fmt::Display + Clone + PartialEq + Send + Sync + 'static;

    /// Identifier used in logs and error messages
    fn resource(&self) -> &str;

    /// Fetch one status snapshot.
    ///
    /// `Ok(None)` means the query succeeded but returned no usable payload;
    /// the engine reports that and keeps polling.
    fn describe(
        &self,
    ) -> impl Future<Output = Result<Option<Self::Snapshot>, DescribeError>> + Send;

    /// Extract the status from a snapshot
    fn status_of(&self, snapshot: &Self::Snapshot) -> Self::Status;

    /// Whether a query error means the watched resource no longer exists
    fn is_absent_error(&self, error: &DescribeError) -> bool;

    /// Whether a status value, when desired, stands for "the resource is gone"
    fn status_means_absent(&self, status: &Self::Status) -> bool;
}
