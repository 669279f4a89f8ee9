use anyhow::Result;
use console::Emoji;

use crate::default_spinner;
use crate::error::rejected;
use crate::platform::{DeploymentResponse, PlatformClient};
use crate::table::draw_table;

static DEPLOYMENT: Emoji = Emoji("🚀 ", "");
static LIST: Emoji = Emoji("📋 ", "");

pub async fn list_deployments(platform: &PlatformClient<'_>) -> Result<()> {
    let progress = default_spinner();
    progress.set_prefix("Listing deployments");
    progress.set_message(format!("{LIST}Loading deployment list..."));
    let resp = platform.list_deployments().await;
    progress.finish_and_clear();
    let resp = resp.map_err(|e| rejected(e.describe()))?;

    if resp.deployments.is_empty() {
        println!(
            "{} No deployments found. How about deploying one?",
            console::style("ℹ️").dim()
        );
        return Ok(());
    }

    let headers = [
        "ID",
        "APP NAME",
        "IMAGE",
        "REPLICAS",
        "STATUS",
        "CONNECTION",
        "CREATED",
    ]
    .map(String::from)
    .to_vec();
    let content = resp.deployments.iter().map(row).collect();

    draw_table(
        format!("{DEPLOYMENT}Deployments ({})", resp.total.max(resp.deployments.len())),
        headers,
        content,
    );
    Ok(())
}

fn row(deployment: &DeploymentResponse) -> Vec<String> {
    vec![
        deployment.id.get(..8).unwrap_or(&deployment.id).to_string(),
        deployment.app_name.clone(),
        deployment.image.clone(),
        deployment.replicas.to_string(),
        deployment.status.clone(),
        deployment.connection(),
        deployment.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ]
}
