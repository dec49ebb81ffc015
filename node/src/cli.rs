//! # CLI Interface
//!
//! Defines the command-line argument structure for `txsub-node` using
//! `clap` derive. Supports four subcommands: `run`, `hash`, `status`,
//! and `version`. Every `run` flag can also be set through a `TXSUB_*`
//! environment variable.

use clap::{Parser, Subcommand};
use std::time::Duration;

use txsub_protocol::config::{
    DEFAULT_CORE_URL, DEFAULT_HTTP_PORT, DEFAULT_METRICS_PORT, PUBLIC_NETWORK_PASSPHRASE,
};
use txsub_protocol::RelayConfig;

/// Transaction submission relay.
///
/// Accepts signed transaction envelopes over HTTP, forwards them to a core
/// node, and reports the node's admission decision.
#[derive(Parser, Debug)]
#[command(
    name = "txsub-node",
    about = "Transaction submission relay",
    version,
    propagate_version = true
)]
pub struct TxsubCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay server.
    Run(RunArgs),
    /// Decode an envelope offline and print its hashes.
    Hash(HashArgs),
    /// Query the status endpoint of a running relay.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Base URL of the core node's HTTP command interface.
    #[arg(long, env = "TXSUB_CORE_URL", default_value = DEFAULT_CORE_URL)]
    pub core_url: String,

    /// Passphrase of the network the core node is connected to.
    #[arg(long, env = "TXSUB_NETWORK_PASSPHRASE", default_value = PUBLIC_NETWORK_PASSPHRASE)]
    pub network_passphrase: String,

    /// Port for the submission API.
    #[arg(long, env = "TXSUB_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "TXSUB_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Deadline for each call to the core node, in milliseconds.
    #[arg(long, env = "TXSUB_SUBMIT_TIMEOUT_MS", default_value_t = 30_000)]
    pub submit_timeout_ms: u64,

    /// Interval between core sync checks, in milliseconds.
    #[arg(long, env = "TXSUB_SYNC_POLL_MS", default_value_t = 5_000)]
    pub sync_poll_ms: u64,

    /// Refuse every submission with 405. Status and metrics stay up.
    #[arg(long, env = "TXSUB_DISABLE_TX_SUB")]
    pub disable_tx_sub: bool,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TXSUB_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(
        long,
        env = "TXSUB_LOG_LEVEL",
        default_value = "txsub_node=info,txsub_protocol=info,tower_http=info"
    )]
    pub log_level: String,
}

impl RunArgs {
    /// Relay configuration described by these flags. Not yet validated.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            network_passphrase: self.network_passphrase.clone(),
            core_url: self.core_url.clone(),
            disable_tx_sub: self.disable_tx_sub,
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
            sync_poll_interval: Duration::from_millis(self.sync_poll_ms),
        }
    }
}

/// Arguments for the `hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Base64 XDR transaction envelope.
    pub envelope: String,

    /// Network passphrase the hash is keyed to.
    #[arg(long, env = "TXSUB_NETWORK_PASSPHRASE", default_value = PUBLIC_NETWORK_PASSPHRASE)]
    pub network_passphrase: String,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Base URL of the running relay.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub url: String,
}
