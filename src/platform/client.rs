use std::path::Path;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{
    BuildJob, BuildLogs, DeploymentList, DeploymentLogs, DeploymentResponse, DeploymentStatus,
    LoginRequest, LoginResponse, Platform,
};
use crate::config::CliConfig;
use crate::error::{PlatformError, check_response};
use crate::model::DeploymentSpec;

const ARCHIVE_MIME: &str = "application/gzip";

pub struct PlatformClient<'a> {
    http: &'a Client,
    config: &'a CliConfig,
    token: Option<String>,
}

impl<'a> PlatformClient<'a> {
    /// Client for authenticated calls; fails if nobody is logged in.
    pub fn new(http: &'a Client, config: &'a CliConfig) -> Result<Self> {
        let token = config.token()?;
        Ok(PlatformClient {
            http,
            config,
            token: Some(token),
        })
    }

    /// Client for the login call, which carries no bearer token.
    pub fn anonymous(http: &'a Client, config: &'a CliConfig) -> Self {
        PlatformClient {
            http,
            config,
            token: None,
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let response = self.authorize(request).send().await?;
        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, PlatformError> {
        let request = self
            .http
            .post(self.config.url("/api/v1/auth/login"))
            .json(&LoginRequest { email, password });
        self.send(request).await
    }

    pub async fn list_deployments(&self) -> Result<DeploymentList, PlatformError> {
        self.send(self.http.get(self.config.url("/api/v1/deployments")))
            .await
    }

    pub async fn deployment_status(&self, id: &str) -> Result<DeploymentStatus, PlatformError> {
        let url = self.config.url(&format!("/api/v1/deployments/{id}/status"));
        self.send(self.http.get(url)).await
    }

    pub async fn delete_deployment(&self, id: &str) -> Result<(), PlatformError> {
        let url = self.config.url(&format!("/api/v1/deployments/{id}"));
        let response = self.authorize(self.http.delete(url)).send().await?;
        check_response(response).await?;
        Ok(())
    }

    pub async fn deployment_logs(
        &self,
        id: &str,
        lines: u32,
    ) -> Result<DeploymentLogs, PlatformError> {
        let url = self.config.url(&format!("/api/v1/deployments/{id}/logs"));
        self.send(self.http.get(url).query(&[("lines", lines)]))
            .await
    }
}

impl Platform for PlatformClient<'_> {
    async fn upload_build(
        &self,
        archive: &Path,
        app_name: &str,
        dockerfile_path: &str,
    ) -> Result<BuildJob, PlatformError> {
        let bytes = tokio::fs::read(archive)
            .await
            .map_err(|source| PlatformError::Io {
                path: archive.to_path_buf(),
                source,
            })?;
        log::debug!(
            "uploading build context {} ({} bytes)",
            archive.display(),
            bytes.len()
        );

        let file_name = archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "context.tar.gz".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(ARCHIVE_MIME)?;
        let form = Form::new()
            .part("context_file", part)
            .text("app_name", app_name.to_string())
            .text("dockerfile_path", dockerfile_path.to_string());

        let request = self
            .http
            .post(self.config.url("/api/v1/builds/upload"))
            .multipart(form);
        self.send(request).await
    }

    async fn build_status(&self, build_id: &str) -> Result<BuildJob, PlatformError> {
        let url = self.config.url(&format!("/api/v1/builds/{build_id}"));
        self.send(self.http.get(url)).await
    }

    async fn build_logs(&self, build_id: &str) -> Result<String, PlatformError> {
        let url = self.config.url(&format!("/api/v1/builds/{build_id}/logs"));
        let logs: BuildLogs = self.send(self.http.get(url)).await?;
        Ok(logs.logs)
    }

    async fn create_deployment(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeploymentResponse, PlatformError> {
        log::debug!("creating deployment {}", spec.app_name);
        let request = self
            .http
            .post(self.config.url("/api/v1/deploy"))
            .json(spec);
        self.send(request).await
    }
}
