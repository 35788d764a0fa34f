//! ProveVM node: serves the VmRuntime gRPC API on top of an external
//! proving engine executable.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use provevm_core::{logging, Config, LogFormat};
use provevm_runtime::{serve_with_shutdown, ExecutionDispatcher, ProcessEngineFactory, ProjectStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

const NODE_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    protocol_version: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Text,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Text => LogFormat::Text,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "provevm-node", version, about = "Proving runtime gRPC node")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "PROVEVM_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `server.listen_addr`
    #[arg(long, env = "PROVEVM_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Overrides `engine.command`
    #[arg(long, env = "PROVEVM_ENGINE_COMMAND")]
    engine_command: Option<String>,

    /// Overrides `logging.format`
    #[arg(long, value_enum, env = "PROVEVM_LOG_FORMAT")]
    log_format: Option<CliLogFormat>,

    /// Print version information as JSON and exit
    #[arg(long)]
    version_json: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default_config(),
    };

    if let Some(addr) = &cli.listen_addr {
        config.server.listen_addr = addr.clone();
    }
    if let Some(command) = &cli.engine_command {
        config.engine.command = command.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, draining in-flight calls");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version_json {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    logging::init_from_config(&config.logging);

    let addr = config.listen_addr()?;
    let store = ProjectStore::new(config.runtime.consume_policy);
    let factory = Arc::new(ProcessEngineFactory::new(config.engine.clone()));
    let dispatcher = Arc::new(ExecutionDispatcher::new(store, factory, &config.runtime));

    tracing::info!(
        engine = %config.engine.command,
        consume_policy = ?config.runtime.consume_policy,
        result_encoding = ?config.runtime.result_encoding,
        timeout_ms = config.runtime.execution_timeout_ms,
        max_concurrent = config.runtime.max_concurrent_executions,
        max_image_bytes = config.runtime.max_image_bytes,
        "starting provevm-node"
    );

    serve_with_shutdown(addr, dispatcher, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    tracing::info!("provevm-node stopped");
    Ok(())
}
