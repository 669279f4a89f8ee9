use crate::config::CliConfig;
use anyhow::Result;
use chrono::DateTime;
use clap::Command;
use serde::Serialize;

pub fn command() -> Command {
    Command::new("auth")
        .about(format!(
            "Auth related commands. For login use {} instead",
            console::style(format!("{} login", env!("CARGO_PKG_NAME"))).bold()
        ))
        .subcommand_required(true)
        .subcommand(
            Command::new("token")
                .about("Print the stored authentication token to stdout")
                .arg(
                    clap::Arg::new("json")
                        .help("Output the token in JSON format")
                        .long("json")
                        .short('j')
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("logout").about("Remove the stored session from the keyring"))
}

#[derive(Serialize)]
struct JsonToken<'a> {
    token: String,
    token_type: &'a str,
    email: &'a str,
    logged_in_at: DateTime<chrono::Utc>,
}

pub async fn handle(config: &mut CliConfig, args: &clap::ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("token", args)) => {
            let token = config.token()?;

            if args.get_flag("json") {
                let session = config
                    .auth_session()
                    .ok_or_else(|| anyhow::anyhow!("No active auth session"))?;
                let json_token = JsonToken {
                    token,
                    token_type: &session.token_type,
                    email: &session.email,
                    logged_in_at: session.logged_in_at,
                };
                println!("{}", serde_json::to_string(&json_token)?);
                return Ok(());
            }
            println!("{token}");
        }
        Some(("logout", _)) => {
            let email = config.auth_session().map(|s| s.email.clone());
            if config.clear_auth()? {
                eprintln!("Logged out {}", email.unwrap_or_default());
            } else {
                eprintln!("Not logged in");
            }
        }
        _ => {
            return Err(anyhow::anyhow!("Unknown auth command"));
        }
    }
    Ok(())
}
