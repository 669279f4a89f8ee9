use anyhow::Result;
use console::{Emoji, style};
use dialoguer::Confirm;

use crate::default_spinner;
use crate::error::rejected;
use crate::platform::PlatformClient;

static DELETE: Emoji = Emoji("🗑️ ", "");

pub async fn delete_deployment(
    platform: &PlatformClient<'_>,
    input: &str,
    id: &str,
    skip_confirm: bool,
) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete deployment {} ({})? This cannot be undone",
                style(input).bold(),
                short(id)
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let progress = default_spinner();
    progress.set_prefix("Deleting deployment...");
    let result = platform.delete_deployment(id).await;
    progress.finish_and_clear();
    result.map_err(|e| rejected(e.describe()))?;

    println!(
        "{DELETE}Deployment {} deleted successfully",
        style(short(id)).yellow()
    );
    Ok(())
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
