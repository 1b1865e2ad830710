//! Port traits implemented by infrastructure crates.

use async_trait::async_trait;

use crate::{BuildUploadInfo, EnrichmentError, InstanceId};

/// Source of build metadata for a build upload.
///
/// Implemented by the `appstore` crate over the App Store Connect REST API.
/// Implementations perform at most one outbound request per call and never
/// cache results across calls.
#[async_trait]
pub trait BuildInfoSource: Send + Sync {
    /// Fetches version, build number, and app name for `build_upload_id`.
    async fn fetch_build_info(
        &self,
        build_upload_id: &InstanceId,
    ) -> Result<BuildUploadInfo, EnrichmentError>;
}
