use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use bluegreen_chaos::chaos::ChaosMode;
use bluegreen_chaos::config::{
    load_contract, validation::validate_contract, ConfigError, FailoverContract, LogFormat,
    PoolTarget,
};
use bluegreen_chaos::failover::{FailoverMonitor, FailoverStatus, PoolRole};
use bluegreen_chaos::lifecycle::{wait_for_signal, Shutdown};
use bluegreen_chaos::observability::logging;

#[derive(Parser)]
#[command(name = "chaosctl")]
#[command(about = "Drive chaos on blue/green backends and watch failover", long_about = None)]
struct Cli {
    /// Backend base URL for instance commands.
    #[arg(short, long, default_value = "http://localhost:3000", global = true)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activate a failure mode (error or timeout)
    Start {
        #[arg(short, long)]
        mode: String,
    },
    /// Clear the failure mode
    Stop,
    /// Show the active failure mode
    Mode,
    /// Call /healthz
    Health,
    /// Call /version
    Version,
    /// Poll primary and backup and report which should take traffic
    Watch(WatchArgs),
}

#[derive(Args)]
struct WatchArgs {
    /// Failover contract file (TOML). Overrides the flags below.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "http://localhost:8081")]
    primary: String,

    #[arg(long, default_value = "http://localhost:8082")]
    backup: String,

    #[arg(long, default_value_t = 5_000)]
    interval_ms: u64,

    #[arg(long, default_value_t = 2_000)]
    timeout_ms: u64,

    /// Run this many rounds, printing each one, and exit instead of
    /// printing selection changes until Ctrl+C.
    #[arg(long)]
    rounds: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Start { mode } => {
            if let Err(e) = ChaosMode::parse_injectable(&mode) {
                // still sent, so the backend's own rejection is shown
                eprintln!("Warning: {}", e);
            }
            let res = client
                .post(format!("{}/chaos/start", base))
                .query(&[("mode", mode.as_str())])
                .send()
                .await?;
            print_response(res).await
        }
        Commands::Stop => {
            let res = client.post(format!("{}/chaos/stop", base)).send().await?;
            print_response(res).await
        }
        Commands::Mode => {
            let res = client.get(format!("{}/chaos", base)).send().await?;
            print_response(res).await
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", base)).send().await?;
            print_response(res).await
        }
        Commands::Version => {
            let res = client.get(format!("{}/version", base)).send().await?;
            print_response(res).await
        }
        Commands::Watch(args) => {
            logging::init_logging(LogFormat::Pretty, "bluegreen_chaos=info");
            let contract = watch_contract(&args)?;
            watch(contract, args.rounds).await?;
            Ok(true)
        }
    }
}

fn watch_contract(args: &WatchArgs) -> Result<FailoverContract, ConfigError> {
    if let Some(path) = &args.config {
        return load_contract(path);
    }

    let pool = |name: &str, url: &str| -> Result<PoolTarget, ConfigError> {
        let url = url.parse().map_err(|e: url::ParseError| ConfigError::Env {
            key: "--primary/--backup",
            value: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(PoolTarget {
            name: name.to_string(),
            url,
        })
    };

    let mut contract = FailoverContract::new(pool("primary", &args.primary)?, pool("backup", &args.backup)?);
    contract.probe.interval_ms = args.interval_ms;
    contract.probe.timeout_ms = args.timeout_ms;
    validate_contract(&contract).map_err(ConfigError::Validation)?;
    Ok(contract)
}

async fn watch(contract: FailoverContract, rounds: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let interval = contract.probe.interval();
    let mut monitor = FailoverMonitor::new(contract);

    if let Some(rounds) = rounds {
        for round in 0..rounds {
            if round > 0 {
                tokio::time::sleep(interval).await;
            }
            let status = monitor.check_once().await;
            println!("{}", serde_json::to_string(&status)?);
        }
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let mut updates = monitor.subscribe();
    let handle = tokio::spawn(monitor.run(shutdown.subscribe()));
    let mut last_active = None;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                if selection_changed(&mut last_active, &status) {
                    println!("{}", serde_json::to_string(&status)?);
                }
            }
            _ = wait_for_signal() => {
                shutdown.trigger();
                break;
            }
        }
    }

    handle.await?;
    Ok(())
}

/// Whether `status` selects a different pool than the last one reported.
/// The first status is always reported.
fn selection_changed(last: &mut Option<Option<PoolRole>>, status: &FailoverStatus) -> bool {
    if *last == Some(status.active) {
        return false;
    }
    *last = Some(status.active);
    true
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let pretty = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or(text);

    if status.is_success() {
        println!("{}", pretty);
    } else {
        eprintln!("Error: backend returned status {}", status);
        eprintln!("{}", pretty);
    }
    Ok(status.is_success())
}
