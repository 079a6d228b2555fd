use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zpoolmon_core::{collect_snapshot, validate_pools, PoolView, RefreshConfig, StatusFetcher, ZpoolCommand};

mod input;
mod panel;
mod report;
mod theme;
mod viewer;
#[cfg(test)]
mod report_tests;
#[cfg(test)]
mod viewer_tests;

#[derive(Debug, Parser)]
#[command(name = "zpoolmon")]
#[command(about = "ZFS pool status monitor (read-only)")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value = "zpool")]
    zpool_bin: PathBuf,

    #[arg(long, global = true, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Write logs here instead of stderr (the dashboard owns the terminal).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the status of each pool once and exit.
    Once {
        pools: Vec<String>,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    /// Live dashboard, refreshed on a timer.
    View {
        pools: Vec<String>,
        /// Seconds between refreshes, 1 to 60.
        #[arg(long, default_value_t = 10)]
        period: u64,
    },
    /// List the pools known to the system.
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config = RefreshConfig {
        fetch_timeout: Duration::from_millis(cli.timeout_ms),
        zpool_bin: cli.zpool_bin.clone(),
        ..RefreshConfig::default()
    };
    let fetcher = ZpoolCommand::from_config(&config);

    match cli.command {
        Command::Once { pools, format } => {
            let pools = validate_pools(&fetcher, &pools).await?;
            return print_once(&fetcher, &pools, format).await;
        }
        Command::View { pools, period } => {
            let pools = validate_pools(&fetcher, &pools).await?;
            let config = RefreshConfig {
                period: Duration::from_secs(period),
                ..config
            };
            info!(period_secs = config.initial_period().as_secs(), ?pools, "starting dashboard");
            viewer::run_dashboard(Arc::new(fetcher), pools, &config).await?;
        }
        Command::List => {
            for name in fetcher.list_pools().await? {
                println!("{name}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn print_once<F>(fetcher: &F, pools: &[String], format: OutputFormat) -> Result<ExitCode>
where
    F: StatusFetcher + ?Sized,
{
    let snapshot = collect_snapshot(fetcher, pools).await?;
    let now = Utc::now().timestamp();

    let views: Vec<PoolView> = snapshot
        .iter()
        .map(|(name, entry)| match entry {
            Ok(pool) => PoolView::build(pool, now),
            Err(err) => {
                warn!(pool = %name, error = %err, "pool status could not be parsed");
                PoolView::failed(name, err)
            }
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        OutputFormat::Human => {
            let mut out = String::new();
            report::write_text(&mut out, &views)?;
            print!("{out}");
        }
    }

    if snapshot.failures().next().is_some() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
