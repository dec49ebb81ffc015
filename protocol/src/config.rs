//! # Relay Configuration & Constants
//!
//! Every magic number the relay depends on lives here: network passphrases,
//! default ports, the wire vocabulary spoken by the node, and the limits we
//! apply to client input. [`RelayConfig`] is the runtime bundle the binary
//! assembles from CLI flags and environment variables.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

/// Public network passphrase. Hashes computed with anything else will not
/// match what the public network expects.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Test network passphrase.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Standalone network passphrase used by local quickstart images.
pub const STANDALONE_PASSPHRASE: &str = "Standalone Network ; February 2017";

// ---------------------------------------------------------------------------
// Network Defaults
// ---------------------------------------------------------------------------

/// Default port for the public submission API.
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 6060;

/// Default HTTP endpoint of the core node's command interface.
pub const DEFAULT_CORE_URL: &str = "http://127.0.0.1:11626";

/// Upper bound on a single outbound submission, measured from the moment the
/// request reaches the relay.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the sync poller asks the node for its state.
pub const DEFAULT_SYNC_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// State string the node reports in `/info` once it has caught up.
pub const CORE_SYNCED_STATE: &str = "Synced!";

// ---------------------------------------------------------------------------
// Envelope Limits
// ---------------------------------------------------------------------------

/// Maximum XDR nesting depth accepted while decoding an envelope.
pub const MAX_XDR_DEPTH: u32 = 500;

/// Maximum decoded envelope size in bytes. Anything larger cannot be a valid
/// transaction and is rejected before it reaches the node.
pub const MAX_ENVELOPE_BYTES: usize = 256 * 1024;

// ---------------------------------------------------------------------------
// Submission Status Codes
// ---------------------------------------------------------------------------

/// HTTP status for an envelope the node queued.
pub const HTTP_STATUS_PENDING: u16 = 201;

/// HTTP status for an envelope the node has already seen.
pub const HTTP_STATUS_DUPLICATE: u16 = 409;

/// HTTP status when the node is overloaded and asks the client to come back.
pub const HTTP_STATUS_TRY_AGAIN_LATER: u16 = 503;

/// HTTP status for an envelope the node rejected outright.
pub const HTTP_STATUS_ERROR: u16 = 400;

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

/// Errors produced by [`RelayConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Hashing with an empty passphrase is meaningless.
    #[error("network passphrase must not be empty")]
    EmptyPassphrase,

    /// The core URL must be an absolute http(s) URL.
    #[error("invalid core url {url}: {reason}")]
    InvalidCoreUrl { url: String, reason: String },

    /// A zero timeout would fail every submission.
    #[error("submit timeout must be greater than zero")]
    ZeroSubmitTimeout,
}

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Passphrase of the network the node is connected to.
    pub network_passphrase: String,
    /// Base URL of the node's HTTP command interface.
    pub core_url: String,
    /// Operator switch: when set, every submission is refused with 405.
    pub disable_tx_sub: bool,
    /// Deadline applied to each outbound submission.
    pub submit_timeout: Duration,
    /// Interval between node `/info` polls.
    pub sync_poll_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            network_passphrase: PUBLIC_NETWORK_PASSPHRASE.to_string(),
            core_url: DEFAULT_CORE_URL.to_string(),
            disable_tx_sub: false,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            sync_poll_interval: DEFAULT_SYNC_POLL_INTERVAL,
        }
    }
}

impl RelayConfig {
    /// Checks the configuration for values that would make every request fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_passphrase.is_empty() {
            return Err(ConfigError::EmptyPassphrase);
        }

        let url = reqwest::Url::parse(&self.core_url).map_err(|e| ConfigError::InvalidCoreUrl {
            url: self.core_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidCoreUrl {
                url: self.core_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        if self.submit_timeout.is_zero() {
            return Err(ConfigError::ZeroSubmitTimeout);
        }
        Ok(())
    }
}

/// Returns a friendly name for a passphrase, mainly for logging.
pub fn network_name(passphrase: &str) -> &'static str {
    match passphrase {
        PUBLIC_NETWORK_PASSPHRASE => "pubnet",
        TESTNET_PASSPHRASE => "testnet",
        STANDALONE_PASSPHRASE => "standalone",
        _ => "custom",
    }
}
