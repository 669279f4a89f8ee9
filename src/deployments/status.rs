use anyhow::Result;
use console::{Emoji, style};

use crate::default_spinner;
use crate::error::rejected;
use crate::platform::{DeploymentStatus, PlatformClient};

static STATUS: Emoji = Emoji("📊 ", "");
static LOCK: Emoji = Emoji("🔒 ", "");
static POD: Emoji = Emoji("📦 ", "");

pub async fn show_status(platform: &PlatformClient<'_>, id: &str) -> Result<()> {
    let progress = default_spinner();
    progress.set_prefix("Fetching status");
    let status = platform.deployment_status(id).await;
    progress.finish_and_clear();
    let status = status.map_err(|e| rejected(e.describe()))?;

    print!("{}", render(&status));
    Ok(())
}

fn render(status: &DeploymentStatus) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!(
        "{STATUS}Deployment {}",
        style(&status.app_name).bold()
    ));
    line(format!("Status: {}", style(&status.status).green()));
    line(format!(
        "Replicas: {}/{} ready",
        status.replicas_ready, status.replicas_desired
    ));

    if let Some(url) = &status.url {
        line(format!("URL: {}", style(url).cyan().underlined()));
    }
    if let Some(cert) = &status.tls_certificate {
        let state = if cert.ready {
            style("ready".to_string()).green()
        } else {
            style(format!("not ready ({})", cert.status)).yellow()
        };
        line(format!("{LOCK}TLS certificate: {state}"));
        if !cert.message.is_empty() {
            line(format!("  {}", cert.message));
        }
    }
    if let Some(note) = &status.url_note {
        line(format!("Note: {}", style(note).dim()));
    }
    if let Some(conn) = &status.tcp_connection {
        line(format!("TCP Connection: {}", style(conn).cyan()));
    }
    if let (Some(size), Some(path)) = (
        &status.persistent_volume_size,
        &status.persistent_volume_mount_path,
    ) {
        line(format!("Persistent Storage: {size} at {path}"));
    }

    if !status.pods.is_empty() {
        line(format!("\n{POD}Pods ({}):", status.pods.len()));
        for pod in &status.pods {
            let fields: Vec<String> = pod
                .iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(s) => format!("{key}={s}"),
                    other => format!("{key}={other}"),
                })
                .collect();
            line(format!("  - {}", fields.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_storage_and_pods() {
        let status: DeploymentStatus = serde_json::from_value(serde_json::json!({
            "app_name": "db",
            "status": "running",
            "replicas_ready": 1,
            "replicas_desired": 1,
            "tcp_connection": "203.0.113.7:31234",
            "persistent_volume_size": "5Gi",
            "persistent_volume_mount_path": "/data",
            "pods": [{"name": "db-0", "phase": "Running", "restarts": 0}]
        }))
        .unwrap();

        let out = console::strip_ansi_codes(&render(&status)).into_owned();
        assert!(out.contains("Replicas: 1/1 ready"));
        assert!(out.contains("Persistent Storage: 5Gi at /data"));
        assert!(out.contains("203.0.113.7:31234"));
        assert!(out.contains("name=db-0, phase=Running, restarts=0"));
        assert!(!out.contains("TLS certificate"));
    }
}
