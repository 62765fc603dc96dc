//! Sheetgate Server Entry Point

use anyhow::Context;
use clap::Parser;
use sheetgate::bootstrap::{self, BootstrapOptions};
use sheetgate::cli::serve::ServerConfig;
use sheetgate::cli::{Cli, Commands};
use sheetgate::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init().context("failed to initialize logging")?;

    // サブコマンド無しは serve と同じ
    let config = match cli.command {
        Some(Commands::Serve(args)) => ServerConfig::resolve(Some(args)),
        None => ServerConfig::resolve(None),
    };

    run_server(config).await
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let options = BootstrapOptions {
        in_memory: config.in_memory,
        ..BootstrapOptions::from_env()
    };
    let state = bootstrap::initialize(options)
        .await
        .context("failed to initialize server")?;

    server::run(state, &config.bind_addr())
        .await
        .with_context(|| format!("server error on {}", config.bind_addr()))
}
