use anyhow::Result;
use console::{Emoji, style};

use crate::default_spinner;
use crate::error::rejected;
use crate::platform::{DeploymentLogs, PlatformClient};

static LOGS: Emoji = Emoji("📋 ", "");
static POD: Emoji = Emoji("📦 ", "");

pub async fn show_logs(platform: &PlatformClient<'_>, id: &str, lines: u32) -> Result<()> {
    let progress = default_spinner();
    progress.set_prefix("Fetching logs");
    let logs = platform.deployment_logs(id, lines).await;
    progress.finish_and_clear();
    let logs = logs.map_err(|e| rejected(e.describe()))?;

    print!("{}", render(&logs));
    Ok(())
}

fn render(logs: &DeploymentLogs) -> String {
    let mut out = format!(
        "{LOGS}Logs for {} ({})\nStatus: {}  Pods: {}\n",
        style(&logs.app_name).bold(),
        logs.image,
        logs.status,
        logs.total_pods
    );

    if let Some(error) = logs.error.as_deref().filter(|e| !e.is_empty()) {
        out.push_str(&format!("{}\n", style(error).red()));
    }
    if logs.logs.is_empty() {
        out.push_str("No pods found\n");
        return out;
    }

    for (pod, pod_logs) in &logs.logs {
        out.push_str(&format!(
            "\n{POD}{} [{}] restarts: {}\n",
            style(pod).cyan(),
            pod_logs.status,
            pod_logs.restart_count
        ));
        out.push_str(&"─".repeat(40));
        out.push('\n');
        if pod_logs.logs.trim().is_empty() {
            out.push_str("No logs available\n");
        } else {
            out.push_str(pod_logs.logs.trim_end());
            out.push('\n');
        }
    }
    out
}
