//! eks-waiter - Stream-based status waiter for EKS clusters
//!
//! This crate watches an EKS cluster (or a pending update against one)
//! through repeated control-plane queries until the resource reaches a
//! desired status, a designated failure status, or the caller aborts the
//! wait. Every observation streams to the caller as it happens.

pub mod aws;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod event;
pub mod poll;
pub mod target;
pub mod update;

pub use cluster::{ClusterSnapshot, ClusterWatcher};
pub use config::{ConfigError, WatchConfig};
pub use event::{WatchError, WatchEvent};
pub use poll::watch;
pub use target::{DescribeError, WatchTarget};
pub use update::{UpdateSnapshot, UpdateWatcher};
