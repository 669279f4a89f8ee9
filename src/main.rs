use std::time::Duration;

use anyhow::Result;
use clap::Command;
use reqwest::Client;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let matches = Command::new("coderun")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deploy container images and source builds to the CodeRun platform")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(coderun::login::command())
        .subcommand(coderun::auth::command())
        .subcommand(coderun::deploy::command())
        .subcommands(coderun::deployments::commands())
        .get_matches();
    let mut config = coderun::config::CliConfig::init();
    let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let r = match matches.subcommand() {
        Some(("login", args)) => coderun::login::handle(&mut config, &http_client, args).await,
        Some(("auth", args)) => coderun::auth::handle(&mut config, args).await,
        Some(("deploy", args)) => coderun::deploy::handle(&mut config, &http_client, args).await,
        Some((name, args)) if coderun::deployments::handles(name) => {
            coderun::deployments::handle(&mut config, &http_client, name, args).await
        }
        _ => {
            eprintln!("Unknown command");
            Ok(())
        }
    };

    if let Err(e) = r {
        log::debug!("Error: {e:?}");
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
