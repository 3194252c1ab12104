//! rpcbridge
//!
//! Exposes an HTTP JSON-RPC tool server to clients that only speak
//! line-delimited JSON-RPC over stdin/stdout.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use rpcbridge::{Bridge, BridgeError};
use rpcbridge_client::ForwardingClient;
use rpcbridge_core::{BridgeConfig, ConfigStorage};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rpcbridge")]
#[command(about = "Proxy stdio JSON-RPC tool calls to an HTTP endpoint", long_about = None)]
struct Args {
    /// Target URL to proxy
    #[arg(long)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Extra header for upstream requests, as KEY=VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Config file (defaults to <config dir>/rpcbridge/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("header name missing in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// File settings first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<BridgeConfig> {
    let storage = match &args.config {
        Some(path) => Some(ConfigStorage::new(path)),
        None => ConfigStorage::default_location(),
    };

    let mut config = match storage {
        Some(storage) => storage
            .load()
            .with_context(|| format!("Failed to load config from {}", storage.path().display()))?,
        None => BridgeConfig::default(),
    };

    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    for (key, value) in &args.headers {
        config.headers.insert(key.clone(), value.clone());
    }

    Ok(config)
}

fn init_logging(level: &str) {
    // stdout carries the protocol; diagnostics go to stderr only
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn run(config: BridgeConfig) -> Result<()> {
    let mut client = ForwardingClient::new(&config.base_url, config.timeout())?;
    for (key, value) in &config.headers {
        client.set_header(key, value)?;
    }
    let bridge = Bridge::new(client);

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            token.cancel();
        });
    }

    tracing::info!(
        url = %bridge.forwarder().base_url(),
        timeout_secs = config.timeout_secs,
        "rpcbridge started. Listening on stdin."
    );

    match bridge
        .listen(token, tokio::io::stdin(), tokio::io::stdout())
        .await
    {
        Ok(()) => {
            tracing::info!("Input closed, shutting down");
            Ok(())
        }
        Err(BridgeError::Cancelled) => {
            tracing::info!("Shutting down...");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to serve stdio"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if config.base_url.trim().is_empty() {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "--url is required")
            .exit();
    }
    config.validate()?;

    init_logging(&config.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config));

    // A cancelled stdin read can stay parked on a blocking thread; don't wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}
