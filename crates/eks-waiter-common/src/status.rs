//! Canonical status vocabularies for cluster and update watches
//!
//! Provides shared `ClusterStatus` and `UpdateStatus` enums over the
//! provider's wire strings, replacing raw string comparisons in the poll
//! loop and the CLI.
//!
//! Both enums carry an `Other` catch-all so a new provider status never
//! fails to parse; an unknown status is simply not terminal and the watch
//! keeps polling.

use serde::{Deserialize, Serialize};

/// Cluster status vocabulary
///
/// The wire spellings match the control-plane API:
/// `CREATING`, `ACTIVE`, `DELETING`, `FAILED`, `UPDATING`, `PENDING`.
///
/// `DeletedOrNotExist` is a synthetic value that never appears in a
/// snapshot. It is only meaningful as a *desired* status: waiting for it
/// means waiting for the cluster to be gone, so a not-found answer from the
/// API is success rather than failure.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
#[serde(into = "String", from = "String")]
pub enum ClusterStatus {
    /// Cluster is being provisioned
    #[strum(serialize = "CREATING")]
    Creating,
    /// Cluster is up and reachable
    #[strum(serialize = "ACTIVE")]
    Active,
    /// Cluster is being torn down
    #[strum(serialize = "DELETING")]
    Deleting,
    /// Provisioning failed; the cluster will not recover
    #[strum(serialize = "FAILED")]
    Failed,
    /// A cluster update is being applied
    #[strum(serialize = "UPDATING")]
    Updating,
    /// Request accepted, work not started yet
    #[strum(serialize = "PENDING")]
    Pending,
    /// Synthetic desired-status value: the cluster is deleted or never existed
    #[strum(serialize = "DELETED/NOT-EXIST")]
    DeletedOrNotExist,
    /// Any status value this vocabulary does not know yet
    #[strum(default)]
    Other(String),
}

impl ClusterStatus {
    /// Parse from a wire string. Total: unknown values become `Other`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| Self::Other(s.to_string()))
    }

    /// Whether this status, when *desired*, means "the cluster is gone"
    pub fn means_absent(&self) -> bool {
        matches!(self, Self::DeletedOrNotExist)
    }
}

impl From<ClusterStatus> for String {
    fn from(status: ClusterStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for ClusterStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Update status vocabulary
///
/// Wire spellings match the control-plane API: `InProgress`, `Successful`,
/// `Failed`, `Cancelled`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
#[serde(into = "String", from = "String")]
pub enum UpdateStatus {
    /// Update is still being applied
    #[strum(serialize = "InProgress")]
    InProgress,
    /// Update finished successfully
    #[strum(serialize = "Successful")]
    Successful,
    /// Update failed
    #[strum(serialize = "Failed")]
    Failed,
    /// Update was cancelled before completing
    #[strum(serialize = "Cancelled")]
    Cancelled,
    /// Any status value this vocabulary does not know yet
    #[strum(default)]
    Other(String),
}

impl UpdateStatus {
    /// Parse from a wire string. Total: unknown values become `Other`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| Self::Other(s.to_string()))
    }

    /// Check if the status represents a terminal state for the update
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed | Self::Cancelled)
    }
}

impl From<UpdateStatus> for String {
    fn from(status: UpdateStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for UpdateStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}
