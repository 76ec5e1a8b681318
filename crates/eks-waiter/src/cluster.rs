//! Cluster status watch
//!
//! Watches a cluster's overall status via `DescribeCluster`. Waiting for
//! `DELETED/NOT-EXIST` makes a not-found answer from the API the success
//! condition instead of a failure.

use crate::aws::EksClient;
use crate::classify;
use crate::config::ConfigError;
use crate::target::{DescribeError, WatchTarget};
use aws_sdk_eks::types::Cluster;
use chrono::{DateTime, Utc};
use eks_waiter_common::ClusterStatus;

/// One fetched observation of a cluster
#[derive(Debug, Clone)]
pub struct ClusterSnapshot {
    /// Cluster name
    pub name: String,
    /// Parsed status value
    pub status: ClusterStatus,
    /// Full raw API payload
    pub cluster: Cluster,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl ClusterSnapshot {
    fn new(name: &str, cluster: Cluster) -> Self {
        let status = ClusterStatus::parse(
            cluster
                .status()
                .map(aws_sdk_eks::types::ClusterStatus::as_str)
                .unwrap_or_default(),
        );
        Self {
            name: name.to_string(),
            status,
            cluster,
            fetched_at: Utc::now(),
        }
    }
}

/// Watches one cluster's overall status
#[derive(Debug)]
pub struct ClusterWatcher {
    client: EksClient,
    name: String,
}

impl ClusterWatcher {
    /// Create a watcher for the named cluster
    pub fn new(client: EksClient, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyClusterName);
        }
        Ok(Self { client, name })
    }
}

impl WatchTarget for ClusterWatcher {
    type Snapshot = ClusterSnapshot;
    type Status = ClusterStatus;

    fn resource(&self) -> &str {
        &self.name
    }

    async fn describe(&self) -> Result<Option<ClusterSnapshot>, DescribeError> {
        let cluster = self.client.describe_cluster(&self.name).await?;
        Ok(cluster.map(|c| ClusterSnapshot::new(&self.name, c)))
    }

    fn status_of(&self, snapshot: &ClusterSnapshot) -> ClusterStatus {
        snapshot.status.clone()
    }

    fn is_absent_error(&self, error: &DescribeError) -> bool {
        classify::is_cluster_gone(error)
    }

    fn status_means_absent(&self, status: &ClusterStatus) -> bool {
        status.means_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_eks::config::BehaviorVersion;
    use aws_sdk_eks::types::ClusterStatus as SdkClusterStatus;

    fn offline_client() -> EksClient {
        let conf = aws_sdk_eks::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        EksClient::from_client(aws_sdk_eks::Client::from_conf(conf))
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ClusterWatcher::new(offline_client(), "").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyClusterName));
    }

    #[test]
    fn snapshot_parses_sdk_status() {
        let cluster = Cluster::builder()
            .name("demo")
            .status(SdkClusterStatus::Creating)
            .build();
        let snapshot = ClusterSnapshot::new("demo", cluster);
        assert_eq!(snapshot.name, "demo");
        assert_eq!(snapshot.status, ClusterStatus::Creating);
    }

    #[test]
    fn snapshot_with_missing_status_is_other() {
        let cluster = Cluster::builder().name("demo").build();
        let snapshot = ClusterSnapshot::new("demo", cluster);
        assert_eq!(snapshot.status, ClusterStatus::Other(String::new()));
    }
}
