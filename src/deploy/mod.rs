pub mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, Command};
use console::{Emoji, style};
use reqwest::Client;

use crate::config::CliConfig;
use crate::default_spinner;
use crate::error::rejected;
use crate::platform::{DeploymentResponse, PlatformClient};
use crate::validate::{self, DEFAULT_DOCKERFILE, DeployFlags};
use pipeline::{Deployed, PipelineOptions};

static CHECK: Emoji = Emoji("✅ ", "");
static ROCKET: Emoji = Emoji("🚀 ", "");
static STOP: Emoji = Emoji("🛑 ", "");

pub fn command() -> Command {
    Command::new("deploy")
        .about("Deploy a container image or build one from source")
        .after_help(
            "Examples:\n  \
             coderun deploy nginx:latest --name my-nginx --http-port 80\n  \
             coderun deploy redis:latest --name my-redis --tcp-port 6379\n  \
             coderun deploy --build . --name my-app --dockerfile Dockerfile.prod\n  \
             coderun deploy postgres:15 --name my-pg --tcp-port 5432 --storage-size 5Gi --storage-path /var/lib/postgresql/data",
        )
        .arg(
            Arg::new("image")
                .help("Container image to deploy (e.g., 'nginx:latest'); omit when using --build")
                .value_name("IMAGE")
                .index(1),
        )
        .arg(
            Arg::new("name")
                .help("Application name (required, 3-30 chars, lowercase letters/numbers/hyphens only)")
                .long("name")
                .short('n')
                .value_name("NAME"),
        )
        .arg(
            Arg::new("replicas")
                .help("Number of replicas")
                .long("replicas")
                .short('r')
                .value_parser(clap::value_parser!(u32))
                .default_value("1"),
        )
        .arg(
            Arg::new("cpu")
                .help("CPU resource limit (e.g., 100m, 0.5)")
                .long("cpu")
                .value_name("CPU"),
        )
        .arg(
            Arg::new("memory")
                .help("Memory resource limit (e.g., 128Mi, 1Gi)")
                .long("memory")
                .short('m')
                .value_name("MEMORY"),
        )
        .arg(
            Arg::new("http_port")
                .help("HTTP port to expose")
                .long("http-port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("tcp_port")
                .help("TCP port to expose")
                .long("tcp-port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("env_file")
                .help("Path to environment file (KEY=VALUE per line)")
                .long("env-file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("storage_size")
                .help("Size of persistent volume (e.g., '1Gi', '500Mi', '10Gi'); forces replicas to 1")
                .long("storage-size")
                .value_name("SIZE"),
        )
        .arg(
            Arg::new("storage_path")
                .help("Path where to mount the volume (e.g., '/data', '/var/lib/mysql')")
                .long("storage-path")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("build")
                .help("Build from source using this directory as build context (e.g., './my-app' or '.')")
                .long("build")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dockerfile")
                .help("Path to Dockerfile relative to the build context")
                .long("dockerfile")
                .value_name("PATH")
                .default_value(DEFAULT_DOCKERFILE),
        )
        .arg(
            Arg::new("build_timeout")
                .help("Give up waiting for the build after this many seconds (default: wait until it finishes)")
                .long("build-timeout")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn flags_from(args: &clap::ArgMatches) -> DeployFlags {
    let string = |id: &str| args.get_one::<String>(id).cloned();
    DeployFlags {
        image: string("image"),
        name: string("name"),
        replicas: args.get_one::<u32>("replicas").copied().unwrap_or(1),
        cpu: string("cpu"),
        memory: string("memory"),
        http_port: args.get_one::<u32>("http_port").copied(),
        tcp_port: args.get_one::<u32>("tcp_port").copied(),
        env_file: args.get_one::<PathBuf>("env_file").cloned(),
        storage_size: string("storage_size"),
        storage_path: string("storage_path"),
        build: args.get_one::<PathBuf>("build").cloned(),
        dockerfile: string("dockerfile").unwrap_or_else(|| DEFAULT_DOCKERFILE.to_string()),
    }
}

pub async fn handle(
    config: &mut CliConfig,
    http_client: &Client,
    args: &clap::ArgMatches,
) -> Result<()> {
    config.ensure_auth()?;

    let flags = flags_from(args);
    let env_file = flags.env_file.clone();
    let plan = validate::build_request(flags).map_err(rejected)?;
    if let Some(path) = env_file {
        println!(
            "Loaded {} environment variables from {}",
            plan.spec.environment_vars.len(),
            path.display()
        );
    }

    let options = PipelineOptions::default().with_build_timeout(
        args.get_one::<u64>("build_timeout")
            .map(|secs| Duration::from_secs(*secs)),
    );
    let platform = PlatformClient::new(http_client, config)?;
    let progress = default_spinner();

    // Dropping the pipeline future on Ctrl-C releases the build archive.
    let result = tokio::select! {
        result = pipeline::run(&platform, plan, &options, &progress) => result,
        _ = tokio::signal::ctrl_c() => {
            progress.finish_and_clear();
            return Err(anyhow::anyhow!("{STOP}Interrupted, nothing was deployed"));
        }
    };
    progress.finish_and_clear();

    let deployed = result.map_err(rejected)?;
    display_deployment(&deployed);
    Ok(())
}

fn display_deployment(deployed: &Deployed) {
    let d: &DeploymentResponse = &deployed.deployment;

    println!("{CHECK}Deployment created successfully!");
    println!("Deployment ID: {}", style(&d.id).yellow());
    println!("App Name: {}", style(&d.app_name).bold());
    println!("Image: {}", d.image);
    println!("Replicas: {}", d.replicas);

    if let Some(cpu) = d.cpu_limit.as_deref().filter(|c| !c.is_empty()) {
        println!("CPU: {cpu}");
    }
    if let Some(memory) = d.memory_limit.as_deref().filter(|m| !m.is_empty()) {
        println!("Memory: {memory}");
    }
    if let Some(port) = d.http_port {
        println!("HTTP Port: {port}");
    }
    if let Some(port) = d.tcp_port {
        println!("TCP Port: {port}");
    }
    if let Some(node_port) = d.tcp_node_port {
        println!("TCP NodePort: {node_port}");
    }
    if let Some(conn) = &d.tcp_connection {
        println!("TCP Connection: {}", style(conn).cyan());
    }
    if let Some(url) = &d.url {
        println!("HTTP URL: {}", style(url).cyan().underlined());
    }
    if let (Some(size), Some(path)) = (&d.persistent_volume_size, &d.persistent_volume_mount_path) {
        println!("Persistent Storage: {size} at {path}");
    }
    if let Some(env) = d.environment_vars.as_ref().filter(|e| !e.is_empty()) {
        println!("Environment Variables: {}", env.len());
    }

    println!("Status: {}", style(&d.status).green());
    println!("Created: {}", d.created_at.format("%Y-%m-%d %H:%M:%S"));

    if deployed.built {
        println!("\n{ROCKET}Successfully built and deployed from source!");
    }
}
