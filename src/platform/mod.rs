//! Authenticated access to the platform API.

mod client;
mod types;

use std::path::Path;

pub use client::PlatformClient;
pub use types::*;

use crate::error::PlatformError;
use crate::model::DeploymentSpec;

/// The calls the deploy pipeline makes. Implemented over HTTP by
/// [`PlatformClient`]; tests substitute a scripted implementation.
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Uploads a build context archive and starts a build job.
    async fn upload_build(
        &self,
        archive: &Path,
        app_name: &str,
        dockerfile_path: &str,
    ) -> Result<BuildJob, PlatformError>;

    async fn build_status(&self, build_id: &str) -> Result<BuildJob, PlatformError>;

    async fn build_logs(&self, build_id: &str) -> Result<String, PlatformError>;

    async fn create_deployment(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeploymentResponse, PlatformError>;
}
