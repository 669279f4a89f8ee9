use clap::Command;
use console::Emoji;
use dialoguer::Input;
use reqwest::Client;
use yapp::PasswordReader;

use crate::config::CliConfig;
use crate::error::rejected;
use crate::platform::PlatformClient;
use anyhow::Result;

static LOCK: Emoji = Emoji("🔒 ", "");

pub fn command() -> Command {
    Command::new("login")
        .about("Login with your account email and password")
        .arg(
            clap::Arg::new("email")
                .short('e')
                .long("email")
                .value_name("EMAIL")
                .help("Email to login with (prompted for when omitted)"),
        )
        .arg(
            clap::Arg::new("password")
                .short('p')
                .long("password")
                .value_name("PASSWORD")
                .help("Optional password to login with. NOTE: RECOMMEND TO LEAVE EMPTY AND USE PROMPT"),
        )
}

pub async fn handle(
    config: &mut CliConfig,
    http_client: &Client,
    args: &clap::ArgMatches,
) -> Result<()> {
    let email = match args.get_one::<String>("email") {
        Some(email) => email.trim().to_string(),
        None => Input::<String>::new()
            .with_prompt("Email")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.contains('@') {
                    Ok(())
                } else {
                    Err("Please enter a valid email address")
                }
            })
            .interact_text()?
            .trim()
            .to_string(),
    };
    let password = match args.get_one::<String>("password") {
        Some(p) => p.clone(),
        None => {
            let mut yapp = yapp::Yapp::new().with_echo_symbol('*');
            yapp.read_password_with_prompt("Password: ")
                .map_err(|e| anyhow::anyhow!("Failed to read password from stdin: {}", e))?
        }
    };
    if email.is_empty() || password.is_empty() {
        return Err(anyhow::anyhow!("Email and password are required"));
    }

    let response = PlatformClient::anonymous(http_client, config)
        .login(&email, &password)
        .await
        .map_err(|e| match e.status() {
            Some(401) => rejected("Invalid email or password"),
            _ => rejected(format!("Login failed: {}", e.describe())),
        })?;
    config.save_auth_from_login(&email, response)?;
    eprintln!("{LOCK}Successfully logged in as {email}");

    Ok(())
}
