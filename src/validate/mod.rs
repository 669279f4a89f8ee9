//! Client-side gate for deployment requests.
//!
//! Rules run in a fixed order and the first violation is reported, so the
//! same flags always produce the same message.

pub mod envfile;
pub mod quantity;

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{BuildSource, DeploymentPlan, DeploymentSpec, ExposedPort, PersistentStorage};
use envfile::EnvFileError;
use quantity::{QuantityError, QuantityKind};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 30;
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid app name pattern"));
static STORAGE_SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[MGT]i$").expect("valid storage size pattern"));

/// Raw `deploy` flags, as collected by the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployFlags {
    pub image: Option<String>,
    pub name: Option<String>,
    pub replicas: u32,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub http_port: Option<u32>,
    pub tcp_port: Option<u32>,
    pub env_file: Option<PathBuf>,
    pub storage_size: Option<String>,
    pub storage_path: Option<String>,
    pub build: Option<PathBuf>,
    pub dockerfile: String,
}

impl Default for DeployFlags {
    fn default() -> Self {
        DeployFlags {
            image: None,
            name: None,
            replicas: 1,
            cpu: None,
            memory: None,
            http_port: None,
            tcp_port: None,
            env_file: None,
            storage_size: None,
            storage_path: None,
            build: None,
            dockerfile: DEFAULT_DOCKERFILE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(
        "App name is required. Use --name to specify one (e.g., --name my-app)\n\
         App name must be 3-30 characters long and contain only lowercase letters, numbers, and hyphens"
    )]
    MissingName,

    #[error("App name must be at least 3 characters long")]
    NameTooShort,

    #[error("App name must be no more than 30 characters long")]
    NameTooLong,

    #[error("App name must contain only lowercase letters, numbers, and hyphens")]
    NameCharacters,

    #[error("App name cannot start or end with a hyphen")]
    NameHyphen,

    #[error("Cannot specify both --http-port and --tcp-port")]
    ConflictingPorts,

    #[error("{protocol} port must be between 1 and 65535 (got {port})")]
    PortOutOfRange { protocol: &'static str, port: u32 },

    #[error("When using persistent storage, both --storage-size and --storage-path are required")]
    StoragePairing,

    #[error("Storage size must be in format like '1Gi', '500Mi', '10Gi' (got '{0}')")]
    StorageSize(String),

    #[error(
        "Storage path must be an absolute path starting with '/' (e.g., '/data', '/var/lib/mysql'), got '{0}'"
    )]
    StoragePath(String),

    #[error("Replicas must be at least 1")]
    Replicas,

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error("Error parsing env file: {0}")]
    EnvFile(#[from] EnvFileError),

    #[error("Either specify an IMAGE to deploy or use --build to build from source")]
    MissingSource,

    #[error("Cannot specify an IMAGE together with --build")]
    ConflictingSource,

    #[error("Image name cannot be empty")]
    EmptyImage,

    #[error("Build context directory does not exist: {}", .0.display())]
    MissingBuildContext(PathBuf),
}

/// Validates and normalizes raw flags into a [`DeploymentPlan`].
///
/// This is the only gate in front of the platform: nothing downstream
/// re-checks the request.
pub fn build_request(flags: DeployFlags) -> Result<DeploymentPlan, ValidationError> {
    let app_name = validate_name(flags.name.as_deref())?;
    let port = validate_ports(flags.http_port, flags.tcp_port)?;
    let storage = validate_storage(
        non_empty(flags.storage_size.as_deref()),
        non_empty(flags.storage_path.as_deref()),
    )?;

    if flags.replicas < 1 {
        return Err(ValidationError::Replicas);
    }
    let mut warnings = Vec::new();
    let mut replicas = flags.replicas;
    if storage.is_some() && replicas > 1 {
        warnings.push(format!(
            "Persistent storage requested, forcing replicas to 1 (was {replicas})"
        ));
        replicas = 1;
    }

    let cpu_limit = non_empty(flags.cpu.as_deref()).map(str::to_string);
    let memory_limit = non_empty(flags.memory.as_deref()).map(str::to_string);
    quantity::validate(cpu_limit.as_deref().unwrap_or_default(), QuantityKind::Cpu)?;
    quantity::validate(memory_limit.as_deref().unwrap_or_default(), QuantityKind::Memory)?;

    let environment_vars = match &flags.env_file {
        Some(path) => envfile::parse(path)?,
        None => Default::default(),
    };

    let (image, build) = resolve_source(flags.image, flags.build, flags.dockerfile)?;

    Ok(DeploymentPlan {
        spec: DeploymentSpec {
            app_name,
            image,
            replicas,
            cpu_limit,
            memory_limit,
            port,
            environment_vars,
            storage,
        },
        build,
        warnings,
    })
}

pub fn validate_name(name: Option<&str>) -> Result<String, ValidationError> {
    let name = non_empty(name).ok_or(ValidationError::MissingName)?;

    if name.len() < NAME_MIN_LEN {
        return Err(ValidationError::NameTooShort);
    }
    if name.len() > NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(ValidationError::NameCharacters);
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ValidationError::NameHyphen);
    }
    Ok(name.to_string())
}

fn validate_ports(
    http_port: Option<u32>,
    tcp_port: Option<u32>,
) -> Result<Option<ExposedPort>, ValidationError> {
    let in_range = |protocol: &'static str, port: u32| {
        u16::try_from(port)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or(ValidationError::PortOutOfRange { protocol, port })
    };

    match (http_port, tcp_port) {
        (Some(_), Some(_)) => Err(ValidationError::ConflictingPorts),
        (Some(port), None) => Ok(Some(ExposedPort::Http(in_range("HTTP", port)?))),
        (None, Some(port)) => Ok(Some(ExposedPort::Tcp(in_range("TCP", port)?))),
        (None, None) => Ok(None),
    }
}

fn validate_storage(
    size: Option<&str>,
    mount_path: Option<&str>,
) -> Result<Option<PersistentStorage>, ValidationError> {
    let (size, mount_path) = match (size, mount_path) {
        (None, None) => return Ok(None),
        (Some(size), Some(mount_path)) => (size, mount_path),
        _ => return Err(ValidationError::StoragePairing),
    };

    if !STORAGE_SIZE_PATTERN.is_match(size) {
        return Err(ValidationError::StorageSize(size.to_string()));
    }
    if !mount_path.starts_with('/') {
        return Err(ValidationError::StoragePath(mount_path.to_string()));
    }

    Ok(Some(PersistentStorage {
        size: size.to_string(),
        mount_path: mount_path.to_string(),
    }))
}

fn resolve_source(
    image: Option<String>,
    build: Option<PathBuf>,
    dockerfile: String,
) -> Result<(Option<String>, Option<BuildSource>), ValidationError> {
    match (image, build) {
        (Some(_), Some(_)) => Err(ValidationError::ConflictingSource),
        (None, None) => Err(ValidationError::MissingSource),
        (Some(image), None) => {
            if image.trim().is_empty() {
                return Err(ValidationError::EmptyImage);
            }
            Ok((Some(image), None))
        }
        (None, Some(context)) => {
            if !context.is_dir() {
                return Err(ValidationError::MissingBuildContext(context));
            }
            let dockerfile = if dockerfile.is_empty() {
                DEFAULT_DOCKERFILE.to_string()
            } else {
                dockerfile
            };
            Ok((None, Some(BuildSource { context, dockerfile })))
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
