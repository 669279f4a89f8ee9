use std::path::Path;
use std::time::Duration;

use console::{Emoji, style};
use indicatif::ProgressBar;
use thiserror::Error;

use crate::error::PlatformError;
use crate::platform::{BuildJob, BuildStatus, Platform};

static CRANE: Emoji = Emoji("🏗️ ", "");
static CHECK: Emoji = Emoji("✅ ", "");
static CROSS: Emoji = Emoji("❌ ", "");
static LOGS: Emoji = Emoji("📋 ", "");

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build failed: {}", .0.friendly())]
    Upload(PlatformError),

    #[error("Error checking build status: {0}")]
    Status(PlatformError),

    #[error("Build {id} failed")]
    Failed { id: String, logs: Option<String> },

    #[error("Build {id} completed without an image URI")]
    MissingImage { id: String },

    #[error("Build {id} did not finish within {polls} status checks (last status: {status})")]
    PollLimit {
        id: String,
        polls: u32,
        status: BuildStatus,
    },
}

/// Client-side view of where a build is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    /// Upload accepted, no poll answered yet.
    Submitted,
    /// Any non-terminal status reported by a poll.
    Running(BuildStatus),
    Completed { image_uri: String },
    Failed,
}

impl BuildPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildPhase::Completed { .. } | BuildPhase::Failed)
    }

    /// Phase implied by a job snapshot returned from a poll.
    fn observe(job: &BuildJob) -> Result<BuildPhase, BuildError> {
        match &job.status {
            BuildStatus::Completed => job
                .image_uri()
                .map(|uri| BuildPhase::Completed {
                    image_uri: uri.to_string(),
                })
                .ok_or_else(|| BuildError::MissingImage { id: job.id.clone() }),
            BuildStatus::Failed => Ok(BuildPhase::Failed),
            other => Ok(BuildPhase::Running(other.clone())),
        }
    }
}

/// Drives one build job from upload to a terminal state.
pub struct BuildOrchestrator<'a, P: Platform> {
    platform: &'a P,
    progress: ProgressBar,
    poll_interval: Duration,
    max_polls: Option<u32>,
}

impl<'a, P: Platform> BuildOrchestrator<'a, P> {
    pub fn new(platform: &'a P, progress: ProgressBar) -> Self {
        BuildOrchestrator {
            platform,
            progress,
            poll_interval: POLL_INTERVAL,
            max_polls: None,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Caps the number of status checks. Without a cap, polling continues until
    /// the job reaches a terminal state or the process is interrupted.
    pub fn max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Uploads `archive`, waits for the job to finish and returns the image URI.
    pub async fn run(
        &self,
        archive: &Path,
        app_name: &str,
        dockerfile_path: &str,
    ) -> Result<String, BuildError> {
        self.progress
            .set_message(format!("{CRANE}Uploading build context and starting build..."));
        let job = self
            .platform
            .upload_build(archive, app_name, dockerfile_path)
            .await
            .map_err(BuildError::Upload)?;

        self.progress.println(format!("{CHECK}Build started successfully!"));
        self.progress.println(format!("Build ID: {}", job.id));
        self.progress.println(format!("Status: {}", job.status));
        if let Some(uri) = job.image_uri() {
            self.progress.println(format!("Image URI: {uri}"));
        }

        self.wait(job).await
    }

    async fn wait(&self, job: BuildJob) -> Result<String, BuildError> {
        let id = job.id;
        let mut phase = BuildPhase::Submitted;
        let mut last_status = job.status;
        let mut polls = 0u32;

        self.progress.set_prefix(format!("Build {}", short_id(&id)));
        self.progress
            .set_message(format!("Waiting for build to complete ({last_status})..."));

        while !phase.is_terminal() {
            if self.max_polls.is_some_and(|max| polls >= max) {
                return Err(BuildError::PollLimit {
                    id,
                    polls,
                    status: last_status,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let job = self
                .platform
                .build_status(&id)
                .await
                .map_err(BuildError::Status)?;

            if job.status != last_status {
                self.progress
                    .println(format!("Build status: {}", style(&job.status).cyan()));
                last_status = job.status.clone();
            }
            self.progress
                .set_message(format!("Waiting for build to complete ({last_status})..."));

            let next = match BuildPhase::observe(&job) {
                Ok(next) => next,
                Err(err) => {
                    self.progress.println(format!("{CROSS}{err}"));
                    self.show_logs(&id).await;
                    return Err(err);
                }
            };
            log::debug!("build {id} poll #{polls}: {phase:?} -> {next:?}");
            phase = next;
        }

        match phase {
            BuildPhase::Completed { image_uri } => {
                self.progress
                    .println(format!("{CHECK}Build completed successfully!"));
                self.show_logs(&id).await;
                Ok(image_uri)
            }
            _ => {
                self.progress.println(format!("{CROSS}Build failed!"));
                let logs = self.show_logs(&id).await;
                Err(BuildError::Failed { id, logs })
            }
        }
    }

    /// Fetches and prints the build logs. Failures are reported, never raised.
    async fn show_logs(&self, id: &str) -> Option<String> {
        let result = self.platform.build_logs(id).await;
        let mut out = vec![format!("\n{LOGS}Build logs:"), "================".to_string()];
        let logs = match result {
            Ok(logs) if logs.trim().is_empty() => {
                out.push("No logs available".to_string());
                Some(logs)
            }
            Ok(logs) => {
                out.push(logs.trim_end().to_string());
                Some(logs)
            }
            Err(e) => {
                log::warn!("could not fetch logs for build {id}: {e}");
                out.push(format!("{CROSS}Could not retrieve build logs: {e}"));
                None
            }
        };
        out.push("================".to_string());
        self.progress.println(out.join("\n"));
        logs
    }
}

fn short_id(id: &str) -> &str {
    id.get(0..8).unwrap_or(id)
}
