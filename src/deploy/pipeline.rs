use std::path::PathBuf;
use std::time::Duration;

use console::{Emoji, style};
use indicatif::ProgressBar;
use thiserror::Error;

use crate::build::{
    BuildArchive, BuildError, BuildOrchestrator, POLL_INTERVAL, PackError, pack,
    validate_dockerfile,
};
use crate::error::PlatformError;
use crate::model::{BuildSource, DeploymentPlan};
use crate::platform::{DeploymentResponse, Platform};

static WARNING: Emoji = Emoji("⚠️  ", "");
static INFO: Emoji = Emoji("ℹ️  ", "");
static PACKAGE: Emoji = Emoji("📦 ", "");
static ROCKET: Emoji = Emoji("🚀 ", "");

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Package(#[from] PackError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Deployment failed: {}", .0.friendly())]
    Rejected(PlatformError),
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub poll_interval: Duration,
    /// `None` polls until the build finishes.
    pub max_polls: Option<u32>,
    /// Where the temporary build context archive is written.
    pub archive_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            poll_interval: POLL_INTERVAL,
            max_polls: None,
            archive_dir: std::env::temp_dir(),
        }
    }
}

impl PipelineOptions {
    /// Converts a wall-clock build timeout into a poll budget.
    pub fn with_build_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.max_polls = timeout.map(|t| {
            let interval = self.poll_interval.as_millis().max(1);
            t.as_millis().div_ceil(interval).clamp(1, u32::MAX as u128) as u32
        });
        self
    }
}

#[derive(Debug)]
pub struct Deployed {
    pub deployment: DeploymentResponse,
    /// Whether the image was built from source during this run.
    pub built: bool,
}

/// Runs a validated plan: builds the image if asked to, then creates the deployment.
///
/// A build that does not complete stops the pipeline before any deployment call.
pub async fn run<P: Platform>(
    platform: &P,
    plan: DeploymentPlan,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<Deployed, DeployError> {
    for warning in &plan.warnings {
        progress.println(format!("{}{}", WARNING, style(warning).yellow()));
    }

    let (spec, built) = match &plan.build {
        Some(source) => {
            let image =
                build_image(platform, &plan.spec.app_name, source, options, progress).await?;
            progress.println(format!("{PACKAGE}Deploying built image {image}..."));
            (plan.spec.with_image(image), true)
        }
        None => {
            progress.println(format!(
                "{PACKAGE}Deploying {}...",
                plan.spec.image.as_deref().unwrap_or_default()
            ));
            (plan.spec, false)
        }
    };

    if spec.http_port().is_some() {
        progress.println(format!(
            "{INFO}Note: Deploy with HTTP port may take several minutes (waiting for TLS certificate)"
        ));
    }
    if spec.tcp_port().is_some() {
        progress.println(format!(
            "{INFO}Note: Deploy with TCP port will be available in the NodePort range (30000-32767)"
        ));
    }

    progress.set_prefix("Deploying");
    progress.set_message(format!("{ROCKET}Creating deployment {}...", spec.app_name));
    let deployment = platform
        .create_deployment(&spec)
        .await
        .map_err(DeployError::Rejected)?;

    Ok(Deployed { deployment, built })
}

async fn build_image<P: Platform>(
    platform: &P,
    app_name: &str,
    source: &BuildSource,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<String, DeployError> {
    progress.println(format!(
        "Building from source in {}...",
        source.context.display()
    ));
    validate_dockerfile(&source.context, &source.dockerfile)?;

    // Removed when this function returns or its future is dropped.
    let archive = BuildArchive::in_dir(&options.archive_dir, app_name);

    progress.set_prefix("Building");
    progress.set_message("Creating build context archive...");
    pack(&source.context, archive.path())?;

    let image = BuildOrchestrator::new(platform, progress.clone())
        .poll_interval(options.poll_interval)
        .max_polls(options.max_polls)
        .run(archive.path(), app_name, &source.dockerfile)
        .await?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_timeout_rounds_up_to_whole_polls() {
        let options = PipelineOptions::default().with_build_timeout(Some(Duration::from_secs(12)));
        assert_eq!(options.max_polls, Some(3));

        let options = PipelineOptions::default().with_build_timeout(Some(Duration::from_secs(1)));
        assert_eq!(options.max_polls, Some(1));

        let options = PipelineOptions::default().with_build_timeout(None);
        assert_eq!(options.max_polls, None);
    }
}
