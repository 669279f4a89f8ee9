#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use coderun::deploy::pipeline::PipelineOptions;
use coderun::error::PlatformError;
use coderun::model::DeploymentSpec;
use coderun::platform::{BuildJob, BuildStatus, DeploymentResponse, Platform};

pub const BUILD_ID: &str = "5b1f6c0e-7a1d-4c55-9f0e-2f4b8d7e9a10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload {
        archive: PathBuf,
        archive_existed: bool,
        app_name: String,
        dockerfile_path: String,
    },
    Status(String),
    Logs(String),
    Create(DeploymentSpec),
}

/// In-memory platform answering from a script, recording every call.
#[derive(Default)]
pub struct ScriptedPlatform {
    pub upload: RefCell<Option<Result<BuildJob, PlatformError>>>,
    pub statuses: RefCell<VecDeque<Result<BuildJob, PlatformError>>>,
    pub logs: RefCell<Option<Result<String, PlatformError>>>,
    pub create: RefCell<Option<Result<DeploymentResponse, PlatformError>>>,
    pub calls: RefCell<Vec<Call>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        ScriptedPlatform::default()
    }

    pub fn upload_ok(self, status: BuildStatus) -> Self {
        *self.upload.borrow_mut() = Some(Ok(BuildJob::new(BUILD_ID, "web", status)));
        self
    }

    pub fn upload_err(self, err: PlatformError) -> Self {
        *self.upload.borrow_mut() = Some(Err(err));
        self
    }

    pub fn then_status(self, status: BuildStatus) -> Self {
        self.statuses
            .borrow_mut()
            .push_back(Ok(BuildJob::new(BUILD_ID, "web", status)));
        self
    }

    pub fn then_status_err(self, err: PlatformError) -> Self {
        self.statuses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn then_completed(self, image_uri: &str) -> Self {
        self.statuses.borrow_mut().push_back(Ok(
            BuildJob::new(BUILD_ID, "web", BuildStatus::Completed).with_image_uri(image_uri),
        ));
        self
    }

    pub fn logs(self, result: Result<String, PlatformError>) -> Self {
        *self.logs.borrow_mut() = Some(result);
        self
    }

    pub fn create_err(self, err: PlatformError) -> Self {
        *self.create.borrow_mut() = Some(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn created(&self) -> Vec<DeploymentSpec> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn status_polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Status(_)))
            .count()
    }
}

impl Platform for ScriptedPlatform {
    async fn upload_build(
        &self,
        archive: &Path,
        app_name: &str,
        dockerfile_path: &str,
    ) -> Result<BuildJob, PlatformError> {
        self.calls.borrow_mut().push(Call::Upload {
            archive: archive.to_path_buf(),
            archive_existed: archive.is_file(),
            app_name: app_name.to_string(),
            dockerfile_path: dockerfile_path.to_string(),
        });
        self.upload
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(BuildJob::new(BUILD_ID, app_name, BuildStatus::Queued)))
    }

    async fn build_status(&self, build_id: &str) -> Result<BuildJob, PlatformError> {
        self.calls
            .borrow_mut()
            .push(Call::Status(build_id.to_string()));
        self.statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(BuildJob::new(build_id, "web", BuildStatus::Running)))
    }

    async fn build_logs(&self, build_id: &str) -> Result<String, PlatformError> {
        self.calls.borrow_mut().push(Call::Logs(build_id.to_string()));
        self.logs
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok("Step 1/1 : FROM scratch".to_string()))
    }

    async fn create_deployment(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeploymentResponse, PlatformError> {
        self.calls.borrow_mut().push(Call::Create(spec.clone()));
        self.create
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(deployment_for(spec)))
    }
}

pub fn deployment_for(spec: &DeploymentSpec) -> DeploymentResponse {
    serde_json::from_value(serde_json::json!({
        "id": "0c7d3e52-3b8a-4f0e-9d61-6a2b1c4e8f00",
        "app_name": spec.app_name,
        "image": spec.image.clone().unwrap_or_default(),
        "replicas": spec.replicas,
        "status": "creating",
        "created_at": "2026-01-02T03:04:05Z",
    }))
    .expect("deployment fixture")
}

pub fn rejected(status: u16, detail: &str) -> PlatformError {
    PlatformError::Rejected {
        status,
        detail: detail.to_string(),
    }
}

/// Options that never sleep and write archives under `dir`.
pub fn fast_options(dir: &Path) -> PipelineOptions {
    PipelineOptions {
        poll_interval: Duration::ZERO,
        max_polls: None,
        archive_dir: dir.to_path_buf(),
    }
}

/// A build context with a Dockerfile and one source file.
pub fn source_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("Dockerfile"), "FROM scratch\nCOPY app.py /\n").expect("Dockerfile");
    fs::write(dir.path().join("app.py"), "print('hi')\n").expect("app.py");
    dir
}

/// Files left in `dir`.
pub fn leftovers(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .expect("read_dir")
        .map(|entry| entry.expect("entry").path())
        .collect()
}
