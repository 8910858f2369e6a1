use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use marionette::bridge::{BridgeConfig, CommandBridge};
use marionette::client::ClientConfig;
use marionette::client::nonblocking::AsyncClient;
use marionette::engine::Engine;
use marionette::engine::cli::CliEngine;
use marionette::engine::fixture::FixtureEngine;
use marionette::models::ActionRequest;
use marionette::retry::RetryPolicy;

#[derive(Parser)]
#[command(name = "marionette", version, about = "Drive a remote GUI-automation engine.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of a running serving layer (e.g. http://localhost:8000)
    #[arg(long, conflicts_with = "engine")]
    server: Option<String>,

    /// Path to the engine executable; invoked directly through the bridge
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Interpreter that launches the engine executable
    #[arg(long, default_value = "java")]
    launcher: String,

    /// Default per-call timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// Retry attempts for server requests
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Print the application's state graph
    Structure,
    /// Print the engine's current observation
    Observe,
    /// Execute one action
    Exec {
        /// Action kind: click, type, drag, wait, ...
        action: String,
        /// Action parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// State expected after the action
        #[arg(long)]
        target: Option<String>,
        /// Per-action timeout in seconds
        #[arg(long)]
        action_timeout: Option<f64>,
    },
    /// Check whether the engine (or server) is reachable
    Probe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = match &cli.command {
        Command::Exec {
            action,
            params,
            target,
            action_timeout,
        } => {
            let mut request = ActionRequest::new(action.clone());
            if let Some(params) = params {
                request.parameters =
                    serde_json::from_str(params).context("--params must be a JSON object")?;
            }
            request.target_state = target.clone();
            request.timeout = *action_timeout;
            Some(request)
        }
        _ => None,
    };

    // Pick a backend once; no per-call branching afterwards.
    if let Some(server) = &cli.server {
        let config = ClientConfig::new(server.clone())
            .with_timeout(Duration::from_secs(cli.timeout))
            .with_retry(RetryPolicy {
                max_attempts: cli.max_attempts,
                ..RetryPolicy::default()
            });
        run_remote(AsyncClient::new(config), &cli.command, request).await
    } else {
        let engine: Box<dyn Engine> = match &cli.engine {
            Some(path) => {
                let config = BridgeConfig::new(path)?
                    .with_launcher(cli.launcher.clone())
                    .with_default_timeout(Duration::from_secs(cli.timeout));
                let bridge = CommandBridge::connect(config)
                    .await
                    .context("engine validation failed")?;
                Box::new(CliEngine::new(bridge))
            }
            None => Box::new(FixtureEngine),
        };
        run_local(engine.as_ref(), &cli.command, request).await
    }
}

async fn run_remote(
    mut client: AsyncClient,
    command: &Command,
    request: Option<ActionRequest>,
) -> anyhow::Result<()> {
    match command {
        Command::Structure => print_json(&client.state_structure().await?)?,
        Command::Observe => print_json(&client.observation().await?)?,
        Command::Exec { .. } => {
            let request = request.context("missing action request")?;
            print_json(&client.execute_action(&request).await?)?;
        }
        Command::Probe => print_json(&client.health().await?)?,
    }
    client.close();
    Ok(())
}

async fn run_local(
    engine: &dyn Engine,
    command: &Command,
    request: Option<ActionRequest>,
) -> anyhow::Result<()> {
    match command {
        Command::Structure => print_json(&engine.state_structure().await?)?,
        Command::Observe => print_json(&engine.observation().await?)?,
        Command::Exec { .. } => {
            let request = request.context("missing action request")?;
            print_json(&engine.execute(&request).await?)?;
        }
        Command::Probe => {
            let available = engine.is_available().await;
            println!("{}", serde_json::json!({ "available": available }));
            if !available {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
