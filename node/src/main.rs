// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txsub Relay Node
//!
//! Entry point for the `txsub-node` binary. Parses CLI arguments, initializes
//! logging and metrics, keeps an eye on the core node's sync state, and
//! serves the submission API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     — start the relay
//! - `hash`    — decode an envelope offline and print its hashes
//! - `status`  — query a running relay's status endpoint
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;
mod sync;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use txsub_protocol::client::HttpCoreClient;
use txsub_protocol::config::network_name;
use txsub_protocol::{
    decode_envelope, CoreClient, InstrumentedCoreClient, SubmissionService, SyncState,
};

use cli::{Commands, TxsubCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TxsubCli::parse();

    match cli.command {
        Commands::Run(args) => run_relay(args).await,
        Commands::Hash(args) => hash_envelope(args),
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the relay: sync poller, submission API, and metrics endpoint.
async fn run_relay(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(&args.log_level, LogFormat::from_str_lossy(&args.log_format));

    let config = args.relay_config();
    config.validate().context("invalid relay configuration")?;

    let network = network_name(&config.network_passphrase);
    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        core_url = %config.core_url,
        network,
        submission_enabled = !config.disable_tx_sub,
        "starting txsub-node"
    );

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- Core client ---
    let core: Arc<dyn CoreClient> = Arc::new(
        HttpCoreClient::new(&config.core_url)
            .with_context(|| format!("invalid core url {}", config.core_url))?,
    );
    let instrumented = InstrumentedCoreClient::new(core.clone(), node_metrics.submissions.clone());

    // --- Sync poller ---
    let sync_state = SyncState::new();
    let shutdown = CancellationToken::new();
    let poller = tokio::spawn(sync::run_sync_poller(
        core,
        sync_state.clone(),
        Arc::clone(&node_metrics),
        config.sync_poll_interval,
        config.submit_timeout,
        shutdown.clone(),
    ));

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: network.to_string(),
        service: SubmissionService::new(&config, instrumented, Arc::new(sync_state)),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("submission API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = metrics::metrics_router(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    shutdown.cancel();
    if let Err(e) = poller.await {
        tracing::warn!("sync poller did not stop cleanly: {}", e);
    }
    tracing::info!("txsub-node stopped");
    Ok(())
}

/// Decodes an envelope and prints its hashes without contacting anything.
fn hash_envelope(args: cli::HashArgs) -> Result<()> {
    let info = decode_envelope(args.envelope.trim(), &args.network_passphrase)
        .context("could not decode envelope")?;

    println!("network    : {}", network_name(&args.network_passphrase));
    println!("type       : {}", info.variant());
    println!("hash       : {}", info.hash_hex());
    if let Some(inner) = info.inner_hash_hex() {
        println!("inner hash : {}", inner);
    }
    Ok(())
}

/// Queries a running relay's status endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let url = format!("{}/status", args.url.trim_end_matches('/'));
    let body = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to reach {}", url))?
        .error_for_status()
        .with_context(|| format!("{} returned an error", url))?
        .text()
        .await
        .context("failed to read status body")?;
    println!("{}", body);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("txsub-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// If a handler cannot be installed, that signal is simply never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
