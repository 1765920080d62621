//! Loadgen Server Binary
//!
//! Synthetic load-generating HTTP service for exercising monitoring and
//! autoscaling pipelines.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use loadgen_config::{ConfigLoader, LoadgenConfig, LogLevel};
use loadgen_logging::init_logging_from_config;
use loadgen_server::{build_runtime, Server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    init_logging_from_config(&config.logging)?;

    let runtime = build_runtime(&config.runtime).context("Failed to build tokio runtime")?;

    runtime.block_on(async move {
        let server = Server::new(config)?;
        server.start().await.inspect_err(|e| tracing::error!("Server failed: {:#}", e))
    })
}

/// Load configuration, then apply CLI argument overrides
fn load_config(cli: &Cli) -> Result<LoadgenConfig> {
    let mut config = ConfigLoader::new()
        .load(cli.config.as_ref())
        .context("Failed to load configuration")?;

    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(level) = &cli.log_level {
        config.logging.level =
            LogLevel::from_str(level).map_err(|e| anyhow::anyhow!("Invalid --log-level: {}", e))?;
    }

    config.validate_all().context("Invalid configuration")?;

    Ok(config)
}
