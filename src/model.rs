use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The single public port a deployment exposes. HTTP and TCP exposure are
/// mutually exclusive, so both cannot be represented at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposedPort {
    #[serde(rename = "http_port")]
    Http(u16),
    #[serde(rename = "tcp_port")]
    Tcp(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentStorage {
    #[serde(rename = "persistent_volume_size")]
    pub size: String,
    #[serde(rename = "persistent_volume_mount_path")]
    pub mount_path: String,
}

/// Canonical deployment request, as accepted by `POST /api/v1/deploy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSpec {
    pub app_name: String,
    /// Unset until a source build resolves it.
    pub image: Option<String>,
    pub replicas: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
    #[serde(flatten)]
    pub port: Option<ExposedPort>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_vars: BTreeMap<String, String>,
    #[serde(flatten)]
    pub storage: Option<PersistentStorage>,
}

impl DeploymentSpec {
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn http_port(&self) -> Option<u16> {
        match self.port {
            Some(ExposedPort::Http(port)) => Some(port),
            _ => None,
        }
    }

    pub fn tcp_port(&self) -> Option<u16> {
        match self.port {
            Some(ExposedPort::Tcp(port)) => Some(port),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSource {
    pub context: PathBuf,
    /// Relative to `context`.
    pub dockerfile: String,
}

/// Validator output: the normalized request, where its image comes from, and
/// any normalizations the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub spec: DeploymentSpec,
    pub build: Option<BuildSource>,
    pub warnings: Vec<String>,
}
