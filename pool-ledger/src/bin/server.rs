//! Pool ledger service binary
//!
//! Reads one JSON request per line from stdin and writes one JSON reply
//! per line to stdout. Logs go to stderr. See `pool_ledger::service` for
//! the request format.

use anyhow::Context;
use pool_ledger::{config::LoggingConfig, Config, Metrics, PoolHandle, Service};
use std::io::BufRead;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config file path as the only argument, environment otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    init_tracing(&config.logging);

    tracing::info!(
        "Starting {} v{} for {}.{}",
        config.service_name,
        config.service_version,
        config.contract.deployer,
        config.contract.name
    );

    let metrics = Metrics::new()?;
    let handle = PoolHandle::open(&config, metrics.clone())?;
    let service = Service::new(handle.clone(), metrics);

    let mut lines = spawn_stdin_reader();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                let line = line.context("reading stdin")?;
                if line.trim().is_empty() {
                    continue;
                }

                let reply = service.handle_line(&line).await?;
                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    tracing::info!("Shutting down pool ledger");
    handle.shutdown().await?;
    Ok(())
}

/// Read stdin on its own thread so a pending read never holds up shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(64);

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
