use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BuildStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl BuildStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Completed | BuildStatus::Failed)
    }
}

impl From<String> for BuildStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => BuildStatus::Queued,
            "running" => BuildStatus::Running,
            "completed" => BuildStatus::Completed,
            "failed" => BuildStatus::Failed,
            _ => BuildStatus::Other(value),
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(value: &str) -> Self {
        BuildStatus::from(value.to_string())
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::Queued => f.write_str("queued"),
            BuildStatus::Running => f.write_str("running"),
            BuildStatus::Completed => f.write_str("completed"),
            BuildStatus::Failed => f.write_str("failed"),
            BuildStatus::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildJob {
    pub id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub dockerfile_path: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl BuildJob {
    pub fn new(id: impl Into<String>, app_name: impl Into<String>, status: BuildStatus) -> Self {
        BuildJob {
            id: id.into(),
            app_name: app_name.into(),
            dockerfile_path: String::new(),
            status,
            image_uri: None,
            tag: None,
            created_at: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = Some(image_uri.into());
        self
    }

    /// The built image, ignoring the empty string the backend sends before completion.
    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref().filter(|uri| !uri.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildLogs {
    #[serde(default)]
    pub logs: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentResponse {
    pub id: String,
    pub app_name: String,
    pub image: String,
    pub replicas: u32,
    #[serde(default)]
    pub cpu_limit: Option<String>,
    #[serde(default)]
    pub memory_limit: Option<String>,
    #[serde(default)]
    pub http_port: Option<u16>,
    #[serde(default)]
    pub tcp_port: Option<u16>,
    #[serde(default)]
    pub tcp_node_port: Option<u16>,
    #[serde(default)]
    pub environment_vars: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub persistent_volume_size: Option<String>,
    #[serde(default)]
    pub persistent_volume_mount_path: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tcp_connection: Option<String>,
}

impl DeploymentResponse {
    /// How to reach the deployment, best information first.
    pub fn connection(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        if let Some(conn) = self.tcp_connection.as_deref().filter(|c| !c.is_empty()) {
            return conn.to_string();
        }
        match (self.http_port, self.tcp_port, self.tcp_node_port) {
            (Some(port), _, _) => format!("HTTP :{port} (URL pending)"),
            (_, Some(_), Some(node_port)) => format!("NodePort {node_port}"),
            (_, Some(port), None) => format!("TCP :{port} (pending)"),
            _ => "Internal only".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentList {
    pub deployments: Vec<DeploymentResponse>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsCertificate {
    pub ready: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatus {
    pub app_name: String,
    pub status: String,
    pub replicas_ready: u32,
    pub replicas_desired: u32,
    #[serde(default)]
    pub pods: Vec<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tcp_connection: Option<String>,
    #[serde(default)]
    pub url_note: Option<String>,
    #[serde(default)]
    pub tls_certificate: Option<TlsCertificate>,
    #[serde(default)]
    pub persistent_volume_size: Option<String>,
    #[serde(default)]
    pub persistent_volume_mount_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodLogs {
    pub status: String,
    #[serde(default)]
    pub logs: String,
    #[serde(default)]
    pub restart_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentLogs {
    pub deployment_id: String,
    pub app_name: String,
    pub image: String,
    pub status: String,
    #[serde(default)]
    pub total_pods: u32,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: BTreeMap<String, PodLogs>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_job_decodes_backend_payload() {
        let job: BuildJob = serde_json::from_str(
            r#"{
                "id": "b-1",
                "client_id": "c-1",
                "app_name": "my-app",
                "tag": "v1",
                "status": "queued",
                "image_uri": "",
                "dockerfile_path": "Dockerfile",
                "k8s_job_name": "build-b-1",
                "created_at": "2025-03-01T10:00:00Z",
                "started_at": null,
                "finished_at": null
            }"#,
        )
        .unwrap();
        assert_eq!(job.status, BuildStatus::Queued);
        assert_eq!(job.image_uri(), None);
        assert!(job.created_at.is_some());
    }

    #[test]
    fn unknown_status_is_kept_and_non_terminal() {
        let status = BuildStatus::from("pushing");
        assert_eq!(status, BuildStatus::Other("pushing".to_string()));
        assert_eq!(status.to_string(), "pushing");
        assert!(!status.is_terminal());
        assert!(BuildStatus::Failed.is_terminal());
        assert!(BuildStatus::Completed.is_terminal());
    }

    fn deployment(json: serde_json::Value) -> DeploymentResponse {
        let mut base = serde_json::json!({
            "id": "d-1",
            "app_name": "web",
            "image": "nginx",
            "replicas": 1,
            "status": "running",
            "created_at": "2025-03-01T10:00:00Z",
        });
        for (k, v) in json.as_object().unwrap() {
            base[k] = v.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn connection_prefers_url_then_tcp_connection() {
        let d = deployment(serde_json::json!({"url": "https://web.example.com", "http_port": 80}));
        assert_eq!(d.connection(), "https://web.example.com");

        let d = deployment(serde_json::json!({"tcp_port": 5432, "tcp_node_port": 30123, "tcp_connection": "1.2.3.4:30123"}));
        assert_eq!(d.connection(), "1.2.3.4:30123");

        let d = deployment(serde_json::json!({"tcp_port": 5432, "tcp_node_port": 30123}));
        assert_eq!(d.connection(), "NodePort 30123");

        let d = deployment(serde_json::json!({}));
        assert_eq!(d.connection(), "Internal only");
    }
}
