//! Commands that inspect or remove existing deployments.

mod delete;
mod list;
mod logs;
mod status;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use reqwest::Client;

use crate::config::CliConfig;
use crate::error::rejected;
use crate::platform::{DeploymentResponse, PlatformClient};
use crate::resolve::{Identifiable, resolve_id};

pub const DEFAULT_LOG_LINES: u32 = 100;

impl Identifiable for DeploymentResponse {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> Option<&str> {
        Some(&self.app_name)
    }
}

fn deployment_arg() -> Arg {
    Arg::new("deployment")
        .help("Deployment ID, app name, or ID prefix")
        .value_name("DEPLOYMENT")
        .required(true)
}

/// Top-level commands handled by [`handle`].
pub fn commands() -> Vec<Command> {
    vec![
        Command::new("list")
            .alias("ls")
            .about("List all your deployments"),
        Command::new("status")
            .about("Show the status of a deployment")
            .arg(deployment_arg()),
        Command::new("delete")
            .alias("rm")
            .about("Delete a deployment")
            .arg(deployment_arg())
            .arg(
                Arg::new("yes")
                    .help("Skip the confirmation prompt")
                    .long("yes")
                    .short('y')
                    .action(ArgAction::SetTrue),
            ),
        Command::new("logs")
            .about("Show logs from a deployment's pods")
            .arg(deployment_arg())
            .arg(
                Arg::new("lines")
                    .help("Number of log lines to fetch per pod")
                    .long("lines")
                    .short('n')
                    .value_parser(clap::value_parser!(u32).range(1..))
                    .default_value("100"),
            ),
    ]
}

pub fn handles(name: &str) -> bool {
    matches!(name, "list" | "status" | "delete" | "logs")
}

pub async fn handle(
    config: &mut CliConfig,
    http_client: &Client,
    name: &str,
    args: &clap::ArgMatches,
) -> Result<()> {
    config.ensure_auth()?;
    let platform = PlatformClient::new(http_client, config)?;

    match name {
        "list" => list::list_deployments(&platform).await,
        "status" => {
            let id = resolve(&platform, deployment(args)).await?;
            status::show_status(&platform, &id).await
        }
        "delete" => {
            let input = deployment(args);
            let id = resolve(&platform, input).await?;
            delete::delete_deployment(&platform, input, &id, args.get_flag("yes")).await
        }
        "logs" => {
            let id = resolve(&platform, deployment(args)).await?;
            let lines = args
                .get_one::<u32>("lines")
                .copied()
                .unwrap_or(DEFAULT_LOG_LINES);
            logs::show_logs(&platform, &id, lines).await
        }
        other => Err(anyhow::anyhow!("Unknown command '{other}'")),
    }
}

fn deployment(args: &clap::ArgMatches) -> &str {
    args.get_one::<String>("deployment")
        .map(String::as_str)
        .unwrap_or_default()
}

async fn resolve(platform: &PlatformClient<'_>, input: &str) -> Result<String> {
    let list = platform
        .list_deployments()
        .await
        .map_err(|e| rejected(e.describe()))?;
    resolve_id(input, &list.deployments, "deployment")
}
