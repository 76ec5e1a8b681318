//! EKS control-plane access
//!
//! Loads AWS SDK configuration once per region and wraps the EKS client
//! behind the two describe calls the watches need, converting SDK errors
//! into the structured [`DescribeError`] the classifier consumes.

use crate::target::DescribeError;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_eks::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_eks::types::{Cluster, Update};
use std::fmt;
use std::sync::Arc;

/// Shared AWS configuration context.
///
/// Holds one loaded SDK config so repeated client construction does not
/// re-resolve credentials and region settings.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl AwsContext {
    /// Load AWS configuration for the specified region from the
    /// environment, config files, and IAM roles.
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// EKS client wrapper exposing the status queries the watches run
#[derive(Clone, Debug)]
pub struct EksClient {
    inner: aws_sdk_eks::Client,
}

impl EksClient {
    /// Create a client from a loaded context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            inner: aws_sdk_eks::Client::new(ctx.sdk_config()),
        }
    }

    pub(crate) fn from_client(inner: aws_sdk_eks::Client) -> Self {
        Self { inner }
    }

    /// Fetch the current cluster payload.
    ///
    /// `Ok(None)` means the API answered without a cluster in the body.
    pub async fn describe_cluster(&self, name: &str) -> Result<Option<Cluster>, DescribeError> {
        let output = self
            .inner
            .describe_cluster()
            .name(name)
            .send()
            .await
            .map_err(into_describe_error)?;
        Ok(output.cluster)
    }

    /// Fetch the current payload of one update against a cluster.
    ///
    /// `Ok(None)` means the API answered without an update in the body.
    pub async fn describe_update(
        &self,
        cluster: &str,
        update_id: &str,
    ) -> Result<Option<Update>, DescribeError> {
        let output = self
            .inner
            .describe_update()
            .name(cluster)
            .update_id(update_id)
            .send()
            .await
            .map_err(into_describe_error)?;
        Ok(output.update)
    }
}

/// Convert an SDK error into the structured code + message pair.
///
/// Service errors expose `code()`/`message()` through
/// `ProvideErrorMetadata`; transport-level errors do not, so the rendered
/// representation stands in for the message and classification falls back
/// to free-text matching on it.
fn into_describe_error<E>(err: SdkError<E>) -> DescribeError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => format!("{err:?}"),
    };
    DescribeError { code, message }
}
