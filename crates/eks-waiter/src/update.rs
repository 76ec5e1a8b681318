//! Update status watch
//!
//! Watches one pending update against a cluster via `DescribeUpdate`.
//! Unlike the cluster watch there is no "gone as desired" outcome: an
//! update id that stops resolving is always a fatal error.

use crate::aws::EksClient;
use crate::classify;
use crate::config::ConfigError;
use crate::target::{DescribeError, WatchTarget};
use aws_sdk_eks::types::Update;
use chrono::{DateTime, Utc};
use eks_waiter_common::UpdateStatus;

/// One fetched observation of a cluster update
#[derive(Debug, Clone)]
pub struct UpdateSnapshot {
    /// Cluster the update applies to
    pub cluster: String,
    /// Update request id
    pub update_id: String,
    /// Parsed status value
    pub status: UpdateStatus,
    /// Full raw API payload
    pub update: Update,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl UpdateSnapshot {
    fn new(cluster: &str, update_id: &str, update: Update) -> Self {
        let status = UpdateStatus::parse(
            update
                .status()
                .map(aws_sdk_eks::types::UpdateStatus::as_str)
                .unwrap_or_default(),
        );
        Self {
            cluster: cluster.to_string(),
            update_id: update_id.to_string(),
            status,
            update,
            fetched_at: Utc::now(),
        }
    }
}

/// Watches one pending update against a cluster
#[derive(Debug)]
pub struct UpdateWatcher {
    client: EksClient,
    cluster: String,
    update_id: String,
    /// `<cluster>/<update-id>` label for logs and errors
    resource: String,
}

impl UpdateWatcher {
    /// Create a watcher for one update request against the named cluster
    pub fn new(
        client: EksClient,
        cluster: impl Into<String>,
        update_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let cluster = cluster.into();
        let update_id = update_id.into();
        if cluster.is_empty() {
            return Err(ConfigError::EmptyClusterName);
        }
        if update_id.is_empty() {
            return Err(ConfigError::EmptyUpdateId);
        }
        let resource = format!("{cluster}/{update_id}");
        Ok(Self {
            client,
            cluster,
            update_id,
            resource,
        })
    }
}

impl WatchTarget for UpdateWatcher {
    type Snapshot = UpdateSnapshot;
    type Status = UpdateStatus;

    fn resource(&self) -> &str {
        &self.resource
    }

    async fn describe(&self) -> Result<Option<UpdateSnapshot>, DescribeError> {
        let update = self
            .client
            .describe_update(&self.cluster, &self.update_id)
            .await?;
        Ok(update.map(|u| UpdateSnapshot::new(&self.cluster, &self.update_id, u)))
    }

    fn status_of(&self, snapshot: &UpdateSnapshot) -> UpdateStatus {
        snapshot.status.clone()
    }

    fn is_absent_error(&self, error: &DescribeError) -> bool {
        classify::is_update_gone(error)
    }

    fn status_means_absent(&self, _status: &UpdateStatus) -> bool {
        false
    }
}
